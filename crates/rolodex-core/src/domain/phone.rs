const COUNTRY_CODE: &str = "92";
const TRUNK_PREFIX: char = '0';
const MOBILE_PREFIX: char = '3';

/// Canonicalizes a phone number to the `+92` dialing form when the digits
/// look like a Pakistani number; anything else comes back as bare digits.
pub fn normalize_phone(value: &str) -> String {
    let digits: String = value.chars().filter(|ch| ch.is_ascii_digit()).collect();

    if digits.starts_with(COUNTRY_CODE) && digits.len() >= 11 {
        return format!("+{digits}");
    }

    if digits.starts_with(TRUNK_PREFIX) && digits.len() == 11 {
        return format!("+{COUNTRY_CODE}{}", &digits[1..]);
    }

    if digits.starts_with(MOBILE_PREFIX) && digits.len() == 10 {
        return format!("+{COUNTRY_CODE}{digits}");
    }

    digits
}
