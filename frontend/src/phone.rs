/// Normalizes a user-entered phone number to `+<digits>` form.
///
/// Numbers already in international form (`+` and 10 to 15 digits) are kept as-is.
/// Otherwise formatting is stripped and US numbers get their country code; any other
/// digit string is prefixed with `+` as a best effort.
pub fn sanitize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_international(trimmed) {
        return trimmed.to_string();
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        0 => String::new(),
        11 if digits.starts_with('1') => format!("+{}", digits),
        10 => format!("+1{}", digits),
        _ => format!("+{}", digits),
    }
}

/// `+` followed by 10 to 15 digits.
pub fn is_international(value: &str) -> bool {
    match value.strip_prefix('+') {
        Some(rest) => (10..=15).contains(&rest.len()) && rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}
