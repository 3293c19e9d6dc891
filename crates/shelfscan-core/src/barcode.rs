//! # Barcode Validation
//!
//! Pure validation helpers for candidate barcode strings.
//!
//! ## Symbologies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Recognized Retail Symbologies                       │
//! │                                                                         │
//! │   EAN-8    8 digits    small packages (e.g., chewing gum)              │
//! │   UPC-A   12 digits    North American retail                            │
//! │   EAN-13  13 digits    worldwide retail (superset of UPC-A)             │
//! │                                                                         │
//! │   All three share the GS1 modulo-10 check digit: weight the digits      │
//! │   right-to-left 3,1,3,1,… (excluding the check digit itself) and the    │
//! │   check digit brings the sum to the next multiple of 10.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Where Validation Is Used
//! Validation gates *manual* entry fields before a lookup is submitted.
//! It is deliberately NOT applied to decoder output inside the session:
//! the hardware decoder already enforces symbology, and the session's
//! contract is to resolve whatever non-empty text its decode source emits.

use crate::error::BarcodeError;
use crate::{MAX_BARCODE_LEN, MIN_BARCODE_LEN};

/// Checks whether a string is shaped like a retail barcode (8-13 digits).
///
/// ## Why This Matters
/// Barcode scanners "type" very fast (a full code in under 50 ms). A cheap
/// shape check lets callers route digit bursts straight to a lookup without
/// waiting for stricter validation or user confirmation.
pub fn is_plausible(code: &str) -> bool {
    let len = code.len();
    (MIN_BARCODE_LEN..=MAX_BARCODE_LEN).contains(&len)
        && code.bytes().all(|b| b.is_ascii_digit())
}

/// Validates a candidate barcode: length, digits, and GS1 check digit.
///
/// ## Arguments
/// * `code` - Candidate barcode string, as typed or decoded
///
/// ## Returns
/// `Ok(())` for a well-formed EAN-8, UPC-A, or EAN-13 code, otherwise the
/// first violation found.
pub fn validate(code: &str) -> Result<(), BarcodeError> {
    if code.is_empty() {
        return Err(BarcodeError::Empty);
    }

    if let Some((position, found)) = code.chars().enumerate().find(|(_, c)| !c.is_ascii_digit()) {
        return Err(BarcodeError::NonDigit { found, position });
    }

    if !matches!(code.len(), 8 | 12 | 13) {
        return Err(BarcodeError::InvalidLength { len: code.len() });
    }

    let digits: Vec<u8> = code.bytes().map(|b| b - b'0').collect();
    let found = digits[digits.len() - 1];
    let expected = check_digit(&digits[..digits.len() - 1]);

    if found != expected {
        return Err(BarcodeError::CheckDigitMismatch { expected, found });
    }

    Ok(())
}

/// Computes the GS1 modulo-10 check digit for the payload digits
/// (everything except the check digit itself).
fn check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            // Right-to-left, the digit adjacent to the check digit gets
            // weight 3, then weights alternate 1,3,1,…
            let weight = if i % 2 == 0 { 3 } else { 1 };
            u32::from(d) * weight
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_shapes() {
        assert!(is_plausible("40111445"));       // EAN-8
        assert!(is_plausible("036000291452"));   // UPC-A
        assert!(is_plausible("3017620422003"));  // EAN-13
        assert!(is_plausible("123456789"));      // 9 digits: shape-plausible

        assert!(!is_plausible(""));
        assert!(!is_plausible("1234567"));        // too short
        assert!(!is_plausible("12345678901234")); // too long
        assert!(!is_plausible("30176204ABCD3"));  // letters
    }

    #[test]
    fn test_validate_known_good_codes() {
        assert_eq!(validate("3017620422003"), Ok(())); // EAN-13
        assert_eq!(validate("036000291452"), Ok(()));  // UPC-A
        assert_eq!(validate("40111445"), Ok(()));      // EAN-8
        assert_eq!(validate("0000000000000"), Ok(())); // degenerate but valid
    }

    #[test]
    fn test_validate_rejects_bad_check_digit() {
        assert_eq!(
            validate("3017620422004"),
            Err(BarcodeError::CheckDigitMismatch {
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn test_validate_rejects_shape_violations() {
        assert_eq!(validate(""), Err(BarcodeError::Empty));
        assert_eq!(
            validate("123456789"),
            Err(BarcodeError::InvalidLength { len: 9 })
        );
        assert_eq!(
            validate("30176204220x3"),
            Err(BarcodeError::NonDigit {
                found: 'x',
                position: 11
            })
        );
    }

    #[test]
    fn test_check_digit_weights() {
        // 3017620422003: payload 301762042200 -> check digit 3
        assert_eq!(check_digit(&[3, 0, 1, 7, 6, 2, 0, 4, 2, 2, 0, 0]), 3);
        // All zeros stays zero
        assert_eq!(check_digit(&[0; 12]), 0);
    }
}
