//! Module path validation.
//!
//! Package and extension names must be importable: a dotted path whose
//! segments are identifiers and not reserved words.

/// Reserved words that can never name an importable module.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Check a single identifier segment.
fn validate_segment(segment: &str) -> Result<(), String> {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return Err("contains an empty segment".to_string());
    };

    if !(first == '_' || first.is_ascii_alphabetic()) {
        return Err(format!(
            "segment `{}` must start with a letter or underscore",
            segment
        ));
    }

    if let Some(bad) = chars.find(|c| !(*c == '_' || c.is_ascii_alphanumeric())) {
        return Err(format!("segment `{}` contains invalid character `{}`", segment, bad));
    }

    if KEYWORDS.contains(&segment) {
        return Err(format!("segment `{}` is a reserved word", segment));
    }

    Ok(())
}

/// Validate a dotted module path such as `cvsu` or `vision.cvsu`.
pub fn validate_module_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    name.split('.').try_for_each(validate_segment)
}

/// Split a module path into its segments.
pub fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split('.')
}
