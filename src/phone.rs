//! Phone validation and input sanitization

use once_cell::sync::Lazy;
use regex::Regex;

/// Egyptian mobile numbers: 010/011/012/015, optionally with the +20 country
/// prefix, followed by eight digits.
static EGYPTIAN_PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+201|01)[0125][0-9]{8}$").expect("phone regex is valid")
});

pub fn is_valid_egyptian_phone(phone: &str) -> bool {
    EGYPTIAN_PHONE.is_match(phone)
}

/// Trim surrounding whitespace and strip angle brackets.
pub fn sanitize(input: &str) -> String {
    input.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_local_and_international_forms() {
        assert!(is_valid_egyptian_phone("01012345678"));
        assert!(is_valid_egyptian_phone("01112345678"));
        assert!(is_valid_egyptian_phone("01212345678"));
        assert!(is_valid_egyptian_phone("01512345678"));
        assert!(is_valid_egyptian_phone("+201012345678"));
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(!is_valid_egyptian_phone("01312345678")); // 013 is not a carrier prefix
        assert!(!is_valid_egyptian_phone("0101234567")); // too short
        assert!(!is_valid_egyptian_phone("010123456789")); // too long
        assert!(!is_valid_egyptian_phone("21012345678"));
        assert!(!is_valid_egyptian_phone(""));
        assert!(!is_valid_egyptian_phone("0101234567a"));
    }

    #[test]
    fn sanitize_strips_angle_brackets_and_whitespace() {
        assert_eq!(sanitize("  Ahmed <script> "), "Ahmed script");
        assert_eq!(sanitize("سارة"), "سارة");
    }
}
