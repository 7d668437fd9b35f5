use regex::Regex;

use crate::models::NotificationError;

/// A string is a valid mobile number iff, after stripping whitespace, it is
/// 10 digits starting with 6-9, optionally prefixed by the country-code
/// string (with or without a leading `+`).
pub fn is_valid_phone(raw: &str, country_code: &str) -> bool {
    let trimmed: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let pattern = format!(r"^(?:\+?{})?[6-9]\d{{9}}$", regex::escape(country_code));
    // The pattern is built from a fixed template, so compilation cannot fail.
    Regex::new(&pattern).map(|re| re.is_match(&trimmed)).unwrap_or(false)
}

/// Normalize a raw phone number to `<country code><10 digits>`.
///
/// Strips every non-digit character, prefixes bare 10-digit numbers with the
/// country code, and de-duplicates an accidentally doubled prefix. Any other
/// shape is rejected before a network attempt is made.
pub fn normalize_phone(raw: &str, country_code: &str) -> Result<String, NotificationError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let doubled = format!("{}{}", country_code, country_code);
    let digits = if digits.starts_with(&doubled) && digits.len() == doubled.len() + 10 {
        digits[country_code.len()..].to_string()
    } else {
        digits
    };

    let national = if digits.len() == 10 {
        digits
    } else if digits.len() == country_code.len() + 10 && digits.starts_with(country_code) {
        digits[country_code.len()..].to_string()
    } else {
        return Err(NotificationError::InvalidPhone(raw.to_string()));
    };

    if !national.starts_with(['6', '7', '8', '9']) {
        return Err(NotificationError::InvalidPhone(raw.to_string()));
    }

    Ok(format!("{}{}", country_code, national))
}
