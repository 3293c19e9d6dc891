//! # shelfscan-session: Scan Session Engine
//!
//! This crate owns scanner configuration state and the barcode-to-product
//! resolution pipeline for one scanning session.
//!
//! ## How a Scan Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Scan-and-Resolve Flow                           │
//! │                                                                         │
//! │  PreferenceStore ──► ScanSession::spawn ──► initial ScannerConfig       │
//! │                             │                     │                     │
//! │                             │                     ▼                     │
//! │                             │          Presentation Shell renders       │
//! │                             │          config, attaches decode source   │
//! │                             │                     │                     │
//! │       decode event ─────────┼─────────────────────┘                     │
//! │       (barcode or empty)    ▼                                           │
//! │                    submit_decode(text)                                  │
//! │                             │                                           │
//! │                             ▼                                           │
//! │                    ProductResolver::resolve  (exactly once per          │
//! │                             │                 accepted submission)      │
//! │                             ▼                                           │
//! │                    ScanOutcome event ──► Presentation Shell reacts      │
//! │                                          (screen change, dialog, …)     │
//! │                                                                         │
//! │  Every failure is classified at the session boundary: resolver errors  │
//! │  become the ConnectionError outcome, preference errors are absorbed.   │
//! │  No operation ever raises an unhandled failure to its caller.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - The scan session actor and its handle
//! - [`prefs`] - Preference store contract and TOML/in-memory backends
//! - [`resolver`] - Product resolver contract and HTTP client
//! - [`error`] - Session error types and classification

pub mod error;
pub mod prefs;
pub mod resolver;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use prefs::{MemoryPreferenceStore, PreferenceStore, TomlPreferenceStore};
pub use resolver::{HttpResolver, ProductResolver, ResolverConfig};
pub use session::{ScanSession, ScanSessionHandle, SessionOptions, SessionStatus};

// Re-export the domain types alongside the engine for convenience
pub use shelfscan_core::{CameraFacing, Product, ScanOutcome, ScannerConfig};
