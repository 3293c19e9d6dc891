//! # Error Types
//!
//! Domain-specific error types for shelfscan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelfscan-core errors (this file)                                     │
//! │  └── BarcodeError     - Barcode shape / check-digit violations         │
//! │                                                                         │
//! │  shelfscan-session errors (separate crate)                             │
//! │  └── SessionError     - Preference, resolver, and session failures     │
//! │                                                                         │
//! │  NOTE: BarcodeError never crosses the session boundary. A rejected     │
//! │  barcode is a validation hint for input fields; the session itself     │
//! │  resolves whatever non-empty text the decode source delivers.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (length, digit, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Barcode Error
// =============================================================================

/// Barcode validation errors.
///
/// Produced by [`crate::barcode::validate`] when a candidate code does not
/// look like a retail barcode the remote database could know about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    /// The code is empty.
    #[error("barcode is empty")]
    Empty,

    /// The code has a length no retail symbology uses.
    #[error("barcode length {len} is not a retail symbology (expected 8, 12, or 13 digits)")]
    InvalidLength { len: usize },

    /// The code contains a non-digit character.
    #[error("barcode contains non-digit character {found:?} at position {position}")]
    NonDigit { found: char, position: usize },

    /// The GS1 check digit does not match.
    #[error("barcode check digit mismatch: expected {expected}, found {found}")]
    CheckDigitMismatch { expected: u8, found: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BarcodeError::InvalidLength { len: 5 };
        assert_eq!(
            err.to_string(),
            "barcode length 5 is not a retail symbology (expected 8, 12, or 13 digits)"
        );

        let err = BarcodeError::CheckDigitMismatch {
            expected: 3,
            found: 7,
        };
        assert_eq!(
            err.to_string(),
            "barcode check digit mismatch: expected 3, found 7"
        );
    }
}
