//! Field format rules shared by every intake path.
//!
//! Each predicate trims its input and tests it against a fixed pattern. There is
//! no locale handling and no lookup beyond the pattern itself.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,20}$").expect("name regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"));
static EIR_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9][A-Za-z0-9]{5}$").expect("eircode regex"));

/// 1 to 20 ASCII letters or digits.
pub fn is_name(value: &str) -> bool {
    NAME.is_match(value.trim())
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Exactly 10 decimal digits.
pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value.trim())
}

/// Six alphanumeric characters, the first a digit.
pub fn is_postal_code(value: &str) -> bool {
    EIR_CODE.is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_name() {
        assert!(is_name("John"));
        assert!(is_name("a"));
        assert!(is_name("Abc123"));
        assert!(is_name("  Mary  "));
        assert!(is_name(&"x".repeat(20)));

        assert!(!is_name(""));
        assert!(!is_name("   "));
        assert!(!is_name(&"x".repeat(21)));
        assert!(!is_name("Mary Ann"));
        assert!(!is_name("O'Neill"));
        assert!(!is_name("Bad Name!"));
        assert!(!is_name("Seán"));
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("j@x.com"));
        assert!(is_email(" someone@mail.example.ie "));

        assert!(!is_email(""));
        assert!(!is_email("no-at-sign.com"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a b@x.com"));
        assert!(!is_email("a@@x.com"));
    }

    #[test]
    fn test_is_phone() {
        assert!(is_phone("0871234567"));
        assert!(is_phone(" 0871234567 "));
        assert!(is_phone(&8712345678u64.to_string()));

        assert!(!is_phone(""));
        assert!(!is_phone("123"));
        assert!(!is_phone("08712345678"));
        assert!(!is_phone("087-123456"));
        assert!(!is_phone("087 1234567"));
    }

    #[test]
    fn test_is_postal_code() {
        assert!(is_postal_code("1A2B3C"));
        assert!(is_postal_code("123456"));
        assert!(is_postal_code(" 9zzzzz "));

        assert!(!is_postal_code("A12345"));
        assert!(!is_postal_code("1234567"));
        assert!(!is_postal_code("12345"));
        assert!(!is_postal_code("1A2 B3"));
        assert!(!is_postal_code("ZZZZZZ"));
        assert!(!is_postal_code(""));
    }

    #[test]
    fn test_name_length_boundaries_hold_for_every_length() {
        for len in 0..=25 {
            let candidate = "a1".repeat(len).chars().take(len).collect::<String>();
            assert_eq!(is_name(&candidate), (1..=20).contains(&len), "length {}", len);
        }
    }
}
