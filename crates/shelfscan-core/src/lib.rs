//! # shelfscan-core: Pure Domain Types for shelfscan
//!
//! This crate is the **heart** of shelfscan. It contains the domain model for
//! the scan-and-resolve pipeline as pure types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       shelfscan Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation Shell (scan-cli)                   │   │
//! │  │    Camera UI ──► Decode events ──► Outcome handling            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ session handle                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   shelfscan-session                             │   │
//! │  │    Preference store, HTTP resolver, session actor              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelfscan-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐  ┌─────────────┐  ┌──────────────────────┐   │   │
//! │  │   │    types    │  │   barcode   │  │        error         │   │   │
//! │  │   │ ScannerConf │  │  EAN/UPC    │  │    BarcodeError      │   │   │
//! │  │   │ ScanOutcome │  │  validation │  │                      │   │   │
//! │  │   └─────────────┘  └─────────────┘  └──────────────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO PERSISTENCE • PURE TYPES            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ScannerConfig, ScanOutcome, Product, etc.)
//! - [`barcode`] - Barcode shape and check-digit validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network, file system, and hardware access is FORBIDDEN here
//! 3. **Immutable Configuration**: `ScannerConfig` is a value object - every
//!    mutation produces a new value with exactly one field changed
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod error;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shelfscan_core::ScannerConfig` instead of
// `use shelfscan_core::types::ScannerConfig`

pub use error::BarcodeError;
pub use types::{CameraFacing, Product, ScanOutcome, ScannerConfig};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum length of a plausible retail barcode (EAN-8).
pub const MIN_BARCODE_LEN: usize = 8;

/// Maximum length of a plausible retail barcode (EAN-13).
///
/// ## Why 13?
/// EAN-13 is the longest symbology the scan pipeline resolves against the
/// remote product database. Longer codes (ITF-14, GS1-128) identify trade
/// units rather than consumer products.
pub const MAX_BARCODE_LEN: usize = 13;
