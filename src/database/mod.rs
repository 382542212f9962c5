//! Program database access.
//!
//! The analysis pass never talks to a disassembler directly. It goes
//! through [`ProgramDatabase`], which exposes the handful of queries the
//! annotation pass needs: function enumeration, body iteration, data
//! references, string literal decoding and the two comment slots.

pub mod json;

pub use json::JsonDatabase;

use crate::models::{Address, CommentKind, FunctionHandle};
use thiserror::Error;

/// Why a string literal could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No string literal is defined at the address.
    #[error("no string literal at {0:#x}")]
    NotAString(Address),

    /// The literal has neither text nor raw bytes.
    #[error("string literal at {0:#x} has no content")]
    Empty(Address),

    /// UTF-16 data with an odd number of bytes.
    #[error("string literal at {0:#x} has odd UTF-16 length {1}")]
    OddLength(Address, usize),

    /// UTF-16 data containing an unpaired surrogate.
    #[error("string literal at {0:#x} is not valid UTF-16")]
    InvalidUtf16(Address),
}

/// Queries and updates the annotation pass performs against a host.
pub trait ProgramDatabase {
    /// Whether the host finished auto-analysis. Results are unreliable otherwise.
    fn is_analysis_complete(&self) -> bool;

    /// Number of functions.
    fn function_count(&self) -> usize;

    /// The function at `index`, if any.
    fn function(&self, index: usize) -> Option<FunctionHandle>;

    /// Addresses of the function body, in order.
    fn body<'a>(&'a self, function: &FunctionHandle) -> Box<dyn Iterator<Item = Address> + 'a>;

    /// Targets of outgoing data references from `address`.
    fn data_refs_from(&self, address: Address) -> Vec<Address>;

    /// Whether `address` holds a string literal.
    fn is_string_literal(&self, address: Address) -> bool;

    /// Decode the string literal at `address`.
    fn decode_string(&self, address: Address) -> Result<String, DecodeError>;

    /// Current comment text in the given slot (empty if none).
    fn comment(&self, function: &FunctionHandle, kind: CommentKind) -> String;

    /// Replace the comment text in the given slot.
    fn set_comment(&mut self, function: &FunctionHandle, text: &str, kind: CommentKind);
}
