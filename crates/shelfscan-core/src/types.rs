//! # Domain Types
//!
//! Core domain types used throughout shelfscan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ScannerConfig  │   │   ScanOutcome   │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  ml_decoder     │   │  Found(Product) │   │  barcode        │       │
//! │  │  facing         │   │  NotFound       │   │  name           │       │
//! │  │  auto_focus     │   │  ManualEntry…   │   │  brands         │       │
//! │  │  flash          │   │  ConnectionErr  │   │  image_url      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │  CameraFacing   │   ScannerConfig is an immutable VALUE OBJECT:      │
//! │  │  ─────────────  │   every mutation returns a new value with exactly  │
//! │  │  Back (default) │   one field changed. ScanOutcome is a transient    │
//! │  │  Front          │   EVENT: one instance per completed scan attempt.  │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// Camera Facing
// =============================================================================

/// Which physical camera drives the scanner preview.
///
/// ## Cycling
/// There are exactly two cameras, so flipping is cyclic with period 2:
/// `facing.flipped().flipped() == facing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    /// Rear-facing camera (the normal scanning camera).
    #[default]
    Back,

    /// Front-facing (selfie) camera.
    Front,
}

impl CameraFacing {
    /// Returns the opposite camera.
    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Back => write!(f, "back"),
            CameraFacing::Front => write!(f, "front"),
        }
    }
}

// =============================================================================
// Scanner Configuration
// =============================================================================

/// The live scanner configuration for one scanning session.
///
/// ## Value Object Semantics
/// Exactly one configuration value is live at any time. Every mutation goes
/// through one of the `with_*` methods, which derive a **new** value from the
/// previous one with exactly one field changed. The session engine persists
/// the new value to the preference store before publishing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerConfig {
    /// Selects the continuous ML frame decoder instead of the classic
    /// single-shot linear decoder (and, orthogonally, the vendor camera API
    /// that goes with it). Read from preferences at session start; there is
    /// no toggle operation for this field.
    pub ml_decoder_enabled: bool,

    /// Which camera feeds the decoder.
    pub facing: CameraFacing,

    /// Whether continuous auto-focus is requested from the camera.
    pub auto_focus_enabled: bool,

    /// Whether the torch/flash is on.
    pub flash_enabled: bool,
}

impl Default for ScannerConfig {
    /// Defaults used when the preference store is empty or unreadable:
    /// classic decoder, back camera, auto-focus on, flash off.
    fn default() -> Self {
        ScannerConfig {
            ml_decoder_enabled: false,
            facing: CameraFacing::Back,
            auto_focus_enabled: true,
            flash_enabled: false,
        }
    }
}

impl ScannerConfig {
    /// Returns a new configuration with auto-focus toggled.
    #[must_use]
    #[inline]
    pub const fn with_auto_focus_toggled(self) -> Self {
        ScannerConfig {
            auto_focus_enabled: !self.auto_focus_enabled,
            ..self
        }
    }

    /// Returns a new configuration with the flash toggled.
    #[must_use]
    #[inline]
    pub const fn with_flash_toggled(self) -> Self {
        ScannerConfig {
            flash_enabled: !self.flash_enabled,
            ..self
        }
    }

    /// Returns a new configuration with the camera facing flipped.
    #[must_use]
    #[inline]
    pub const fn with_facing_flipped(self) -> Self {
        ScannerConfig {
            facing: self.facing.flipped(),
            ..self
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product returned by the remote resolver.
///
/// ## Design Notes
/// This is a snapshot of the remote record at lookup time, trimmed to the
/// fields the scan flow surfaces. The full product-edit workflow operates on
/// a richer model and is out of scope here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// The barcode the product was resolved from.
    pub barcode: String,

    /// Display name shown to the user.
    pub name: String,

    /// Brand list as reported by the database (comma-separated).
    #[serde(default)]
    pub brands: Option<String>,

    /// Net quantity text (e.g., "500 g").
    #[serde(default)]
    pub quantity: Option<String>,

    /// URL of the front image, if the database has one.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Nutrition grade letter ("a" through "e"), if computed.
    #[serde(default)]
    pub nutrition_grade: Option<String>,
}

// =============================================================================
// Scan Outcome
// =============================================================================

/// Terminal outcome of a single scan/lookup attempt.
///
/// ## Event Semantics
/// Outcomes are transient events, not persisted state. Each is delivered at
/// most once to the subscribers present at emission time; there is no replay
/// for late subscribers.
///
/// ## Outcome Flow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  submit_decode(text)                                                    │
/// │       │                                                                 │
/// │       ├── absent/empty ─────────────────────► ManualEntryRequested      │
/// │       │                                                                 │
/// │       └── non-empty ──► resolver lookup                                 │
/// │                              │                                          │
/// │                              ├── product ───► Found(product)            │
/// │                              ├── no record ─► NotFound                  │
/// │                              └── failure ───► ConnectionError           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "product", rename_all = "camelCase")]
pub enum ScanOutcome {
    /// Lookup succeeded and returned a product.
    Found(Product),

    /// Lookup succeeded but no product exists for the code.
    NotFound,

    /// The user explicitly asked for manual barcode entry, or the decode
    /// source produced an empty/absent code.
    ManualEntryRequested,

    /// The lookup attempt failed (timeout, transport error, malformed
    /// response). The underlying detail is logged, not carried here.
    ConnectionError,
}

impl ScanOutcome {
    /// Stable short name for logging and status snapshots.
    pub const fn kind(&self) -> &'static str {
        match self {
            ScanOutcome::Found(_) => "found",
            ScanOutcome::NotFound => "not_found",
            ScanOutcome::ManualEntryRequested => "manual_entry_requested",
            ScanOutcome::ConnectionError => "connection_error",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            barcode: "3017620422003".to_string(),
            name: "Nutella".to_string(),
            brands: Some("Ferrero".to_string()),
            quantity: Some("400 g".to_string()),
            image_url: None,
            nutrition_grade: Some("e".to_string()),
        }
    }

    #[test]
    fn test_facing_flip_is_cyclic() {
        assert_eq!(CameraFacing::Back.flipped(), CameraFacing::Front);
        assert_eq!(CameraFacing::Front.flipped(), CameraFacing::Back);
        assert_eq!(CameraFacing::Back.flipped().flipped(), CameraFacing::Back);
    }

    #[test]
    fn test_toggle_changes_exactly_one_field() {
        // Exhaustive over all 8 prior states (2^3 toggleable-relevant fields
        // times the untoggleable backend flag folded in below).
        for ml in [false, true] {
            for auto_focus in [false, true] {
                for flash in [false, true] {
                    for facing in [CameraFacing::Back, CameraFacing::Front] {
                        let base = ScannerConfig {
                            ml_decoder_enabled: ml,
                            facing,
                            auto_focus_enabled: auto_focus,
                            flash_enabled: flash,
                        };

                        let toggled = base.with_auto_focus_toggled();
                        assert_eq!(toggled.auto_focus_enabled, !base.auto_focus_enabled);
                        assert_eq!(toggled.flash_enabled, base.flash_enabled);
                        assert_eq!(toggled.facing, base.facing);
                        assert_eq!(toggled.ml_decoder_enabled, base.ml_decoder_enabled);

                        let toggled = base.with_flash_toggled();
                        assert_eq!(toggled.flash_enabled, !base.flash_enabled);
                        assert_eq!(toggled.auto_focus_enabled, base.auto_focus_enabled);
                        assert_eq!(toggled.facing, base.facing);
                        assert_eq!(toggled.ml_decoder_enabled, base.ml_decoder_enabled);

                        let toggled = base.with_facing_flipped();
                        assert_eq!(toggled.facing, base.facing.flipped());
                        assert_eq!(toggled.auto_focus_enabled, base.auto_focus_enabled);
                        assert_eq!(toggled.flash_enabled, base.flash_enabled);
                        assert_eq!(toggled.ml_decoder_enabled, base.ml_decoder_enabled);
                    }
                }
            }
        }
    }

    #[test]
    fn test_double_toggle_is_identity() {
        let base = ScannerConfig::default();
        assert_eq!(base.with_auto_focus_toggled().with_auto_focus_toggled(), base);
        assert_eq!(base.with_flash_toggled().with_flash_toggled(), base);
        assert_eq!(base.with_facing_flipped().with_facing_flipped(), base);
    }

    #[test]
    fn test_outcome_kind_names() {
        assert_eq!(ScanOutcome::Found(sample_product()).kind(), "found");
        assert_eq!(ScanOutcome::NotFound.kind(), "not_found");
        assert_eq!(
            ScanOutcome::ManualEntryRequested.kind(),
            "manual_entry_requested"
        );
        assert_eq!(ScanOutcome::ConnectionError.kind(), "connection_error");
    }

    #[test]
    fn test_outcome_serializes_with_kind_tag() {
        let json = serde_json::to_value(ScanOutcome::NotFound).unwrap();
        assert_eq!(json["kind"], "notFound");

        let json = serde_json::to_value(ScanOutcome::Found(sample_product())).unwrap();
        assert_eq!(json["kind"], "found");
        assert_eq!(json["product"]["barcode"], "3017620422003");
    }
}
