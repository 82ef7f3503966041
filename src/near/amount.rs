use thiserror::Error;

/// Number of fractional digits in one NEAR (1 NEAR = 10^24 yoctoNEAR).
pub const NEAR_NOMINATION_EXP: usize = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount '{0}': only digits and a single '.' are allowed")]
    InvalidFormat(String),
    #[error("Too many decimal places in '{0}' (max {NEAR_NOMINATION_EXP})")]
    TooPrecise(String),
    #[error("Amount '{0}' is too large")]
    Overflow(String),
}

/// Convert a human readable NEAR amount ("1.5", "1,000", "") into yoctoNEAR.
///
/// An empty (or whitespace-only) input is zero.
///
/// # Examples
///
/// ```
/// use guestbook::near::parse_near_amount;
///
/// assert_eq!(parse_near_amount("1").unwrap(), 1_000_000_000_000_000_000_000_000);
/// assert_eq!(parse_near_amount("0.000000000000000000000001").unwrap(), 1);
/// assert_eq!(parse_near_amount("").unwrap(), 0);
/// assert!(parse_near_amount("1.2.3").is_err());
/// ```
pub fn parse_near_amount(input: &str) -> Result<u128, AmountError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(0);
    }

    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::InvalidFormat(input.to_string()));
    }
    if fraction.len() > NEAR_NOMINATION_EXP {
        return Err(AmountError::TooPrecise(input.to_string()));
    }

    let padded = format!("{whole}{fraction:0<width$}", width = NEAR_NOMINATION_EXP);
    let digits = padded.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<u128>()
        .map_err(|_| AmountError::Overflow(input.to_string()))
}
