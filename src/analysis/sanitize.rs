//! String content normalization.

/// Replace every character outside printable ASCII with a space, then trim
/// leading and trailing spaces.
pub fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { ' ' })
        .collect();

    replaced.trim_matches(' ').to_string()
}
