//! # Scan Session
//!
//! Single authority for scanner configuration and the barcode-to-product
//! resolution pipeline for one scanning session.
//!
//! ## Session Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ScanSession Architecture                           │
//! │                                                                         │
//! │  ┌──────────────────┐   commands (mpsc)   ┌─────────────────────────┐  │
//! │  │ ScanSessionHandle│ ───────────────────► │   session actor task    │  │
//! │  │                  │                      │                         │  │
//! │  │ toggle_*()       │ ◄─────────────────── │ • single writer for     │  │
//! │  │ submit_decode()  │   config (watch,     │   ScannerConfig         │  │
//! │  │ request_manual…()│    replay-latest)    │ • spawns one lookup     │  │
//! │  │ status()         │ ◄─────────────────── │   task at a time        │  │
//! │  │ shutdown()       │   outcomes           │ • maps lookup results   │  │
//! │  └──────────────────┘   (broadcast,        │   to ScanOutcome        │  │
//! │                          no replay)        └───────────┬─────────────┘  │
//! │                                                        │                │
//! │                                            ┌───────────▼─────────────┐  │
//! │                                            │ lookup task (spawned)   │  │
//! │                                            │ resolver.resolve(code)  │  │
//! │                                            │ bounded by timeout      │  │
//! │                                            └─────────────────────────┘  │
//! │                                                                         │
//! │  STATE MACHINE (per submission):  Idle ──► Resolving ──► Idle           │
//! │  Toggles and manual-entry requests are independent of this machine.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Contract
//! - Only the actor task mutates configuration, so two toggles issued
//!   back-to-back are both reflected in the final published value - there is
//!   no stale-read window.
//! - At most one lookup is in flight. While one is outstanding, further
//!   decode submissions are dropped (a session is one logical "find this
//!   barcode" operation; a continuous decoder re-delivers the code anyway).
//! - When the session is torn down with a lookup in flight, the lookup's
//!   completion message has no receiver and its outcome is never published.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shelfscan_core::{ScanOutcome, ScannerConfig};

use crate::error::{SessionError, SessionResult};
use crate::prefs::{load_config_or_defaults, PreferenceStore};
use crate::resolver::ProductResolver;

// =============================================================================
// Session Options
// =============================================================================

/// Tunable session parameters.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Upper bound on one resolver call. Expiry maps to `ConnectionError`.
    pub lookup_timeout: Duration,

    /// Command channel capacity.
    pub command_capacity: usize,

    /// Outcome broadcast capacity. Outcomes are one-shot events; slow
    /// subscribers that fall more than this far behind lose the oldest.
    pub outcome_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            lookup_timeout: Duration::from_secs(30),
            command_capacity: 32,
            outcome_capacity: 16,
        }
    }
}

// =============================================================================
// Session Status
// =============================================================================

/// Snapshot of session state for external queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Session identifier (UUID v4), for log correlation.
    pub session_id: String,

    /// When the session was spawned.
    pub started_at: DateTime<Utc>,

    /// Whether a lookup is currently in flight.
    pub resolving: bool,

    /// Decode submissions accepted (including empty ones).
    pub scans_submitted: u64,

    /// Decode submissions dropped because a lookup was in flight.
    pub scans_dropped: u64,

    /// Kind of the most recent outcome, if any.
    pub last_outcome: Option<String>,

    /// Most recent absorbed error detail (resolver or preference store).
    pub last_error: Option<String>,
}

// =============================================================================
// Commands
// =============================================================================

/// Commands accepted by the session actor.
enum Command {
    ToggleAutoFocus,
    ToggleFlash,
    FlipCamera,
    SubmitDecode(Option<String>),
    RequestManualEntry,
    Status(oneshot::Sender<SessionStatus>),
    Shutdown,
}

/// Completion message from a spawned lookup task.
struct LookupDone {
    outcome: ScanOutcome,
    error_detail: Option<String>,
}

// =============================================================================
// Session Handle
// =============================================================================

/// Handle for driving a running scan session.
///
/// Cloneable; every clone talks to the same actor. All operations return
/// `Err(ShuttingDown)` once the actor is gone.
#[derive(Clone)]
pub struct ScanSessionHandle {
    cmd_tx: mpsc::Sender<Command>,
    config_rx: watch::Receiver<ScannerConfig>,
    outcome_tx: broadcast::Sender<ScanOutcome>,
}

impl ScanSessionHandle {
    /// Returns the current scanner configuration.
    pub fn config(&self) -> ScannerConfig {
        *self.config_rx.borrow()
    }

    /// Returns a replay-latest configuration watcher: a new subscriber
    /// immediately observes the current configuration.
    pub fn watch_config(&self) -> watch::Receiver<ScannerConfig> {
        self.config_rx.clone()
    }

    /// Subscribes to scan outcomes. Fire-once-per-event: only subscribers
    /// present at emission time receive an outcome, there is no replay.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<ScanOutcome> {
        self.outcome_tx.subscribe()
    }

    /// Toggles continuous auto-focus.
    pub async fn toggle_auto_focus(&self) -> SessionResult<()> {
        self.send(Command::ToggleAutoFocus).await
    }

    /// Toggles the torch/flash.
    pub async fn toggle_flash(&self) -> SessionResult<()> {
        self.send(Command::ToggleFlash).await
    }

    /// Flips between the back and front camera.
    pub async fn flip_camera(&self) -> SessionResult<()> {
        self.send(Command::FlipCamera).await
    }

    /// Submits one decode event.
    ///
    /// Absent or empty text yields a `ManualEntryRequested` outcome without
    /// any network call. Non-empty text triggers exactly one resolution
    /// attempt unless a lookup is already in flight, in which case the
    /// submission is dropped.
    pub async fn submit_decode(&self, text: Option<String>) -> SessionResult<()> {
        self.send(Command::SubmitDecode(text)).await
    }

    /// Emits a `ManualEntryRequested` outcome unconditionally.
    pub async fn request_manual_entry(&self) -> SessionResult<()> {
        self.send(Command::RequestManualEntry).await
    }

    /// Returns a status snapshot.
    ///
    /// Because commands are processed in order, awaiting this also acts as a
    /// barrier: every operation issued before it on this handle has been
    /// handled when it returns.
    pub async fn status(&self) -> SessionResult<SessionStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx)).await?;
        rx.await.map_err(|_| SessionError::ShuttingDown)
    }

    /// Shuts the session down.
    ///
    /// An in-flight lookup is discarded at the publication boundary; no
    /// outcome is published after this returns and the actor has stopped.
    pub async fn shutdown(&self) -> SessionResult<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, cmd: Command) -> SessionResult<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::ShuttingDown)
    }
}

// =============================================================================
// Session Actor
// =============================================================================

/// The session actor. Owns all mutable session state.
pub struct ScanSession {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    options: SessionOptions,

    prefs: Arc<dyn PreferenceStore>,
    resolver: Arc<dyn ProductResolver>,

    config_tx: watch::Sender<ScannerConfig>,
    outcome_tx: broadcast::Sender<ScanOutcome>,
    done_tx: mpsc::Sender<LookupDone>,

    resolving: bool,
    scans_submitted: u64,
    scans_dropped: u64,
    last_outcome: Option<&'static str>,
    last_error: Option<String>,
}

impl ScanSession {
    /// Spawns a scan session and returns its handle.
    ///
    /// Initialization happens here, before the actor task starts: all four
    /// configuration fields are read from the preference store (a field that
    /// fails to load falls back to its default), and the resulting
    /// `ScannerConfig` is published as the initial value of the configuration
    /// channel. No toggle can therefore ever observe an uninitialized
    /// configuration.
    pub fn spawn(
        prefs: Arc<dyn PreferenceStore>,
        resolver: Arc<dyn ProductResolver>,
        options: SessionOptions,
    ) -> ScanSessionHandle {
        let session_id = Uuid::new_v4();
        let initial = load_config_or_defaults(prefs.as_ref());

        let (config_tx, config_rx) = watch::channel(initial);
        let (outcome_tx, _) = broadcast::channel(options.outcome_capacity);
        let (cmd_tx, cmd_rx) = mpsc::channel(options.command_capacity);
        let (done_tx, done_rx) = mpsc::channel(1);

        info!(
            session_id = %session_id,
            ml_decoder = initial.ml_decoder_enabled,
            facing = %initial.facing,
            auto_focus = initial.auto_focus_enabled,
            flash = initial.flash_enabled,
            "Scan session starting"
        );

        let session = ScanSession {
            session_id,
            started_at: Utc::now(),
            options,
            prefs,
            resolver,
            config_tx,
            outcome_tx: outcome_tx.clone(),
            done_tx,
            resolving: false,
            scans_submitted: 0,
            scans_dropped: 0,
            last_outcome: None,
            last_error: None,
        };

        tokio::spawn(session.run(cmd_rx, done_rx));

        ScanSessionHandle {
            cmd_tx,
            config_rx,
            outcome_tx,
        }
    }

    /// Main command loop.
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<Command>,
        mut done_rx: mpsc::Receiver<LookupDone>,
    ) {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(Command::ToggleAutoFocus) => self.toggle(Toggle::AutoFocus),
                        Some(Command::ToggleFlash) => self.toggle(Toggle::Flash),
                        Some(Command::FlipCamera) => self.toggle(Toggle::Facing),
                        Some(Command::SubmitDecode(text)) => self.handle_decode(text),
                        Some(Command::RequestManualEntry) => {
                            self.emit(ScanOutcome::ManualEntryRequested);
                        }
                        Some(Command::Status(reply)) => {
                            let _ = reply.send(self.status_snapshot());
                        }
                        Some(Command::Shutdown) | None => break,
                    }
                }

                Some(done) = done_rx.recv() => {
                    self.resolving = false;
                    if let Some(detail) = done.error_detail {
                        self.last_error = Some(detail);
                    }
                    self.emit(done.outcome);
                }
            }
        }

        info!(session_id = %self.session_id, "Scan session stopped");
    }

    /// Applies one toggle: persist first, publish second.
    ///
    /// A store write failure is logged and absorbed; the new configuration is
    /// still published so the user-visible state stays responsive.
    fn toggle(&mut self, which: Toggle) {
        let current = *self.config_tx.borrow();

        let (new_config, persisted) = match which {
            Toggle::AutoFocus => {
                let next = current.with_auto_focus_toggled();
                (next, self.prefs.set_auto_focus(next.auto_focus_enabled))
            }
            Toggle::Flash => {
                let next = current.with_flash_toggled();
                (next, self.prefs.set_flash(next.flash_enabled))
            }
            Toggle::Facing => {
                let next = current.with_facing_flipped();
                (next, self.prefs.set_facing(next.facing))
            }
        };

        if let Err(e) = persisted {
            warn!(session_id = %self.session_id, error = %e, "Failed to persist scanner preference");
            self.last_error = Some(e.to_string());
        }

        debug!(
            session_id = %self.session_id,
            facing = %new_config.facing,
            auto_focus = new_config.auto_focus_enabled,
            flash = new_config.flash_enabled,
            "Scanner configuration changed"
        );
        self.config_tx.send_replace(new_config);
    }

    /// Handles one decode submission.
    fn handle_decode(&mut self, text: Option<String>) {
        let barcode = match text {
            Some(t) if !t.trim().is_empty() => t,
            // "No usable code" is policy-equivalent to an explicit
            // manual-entry request: no network call
            _ => {
                self.scans_submitted += 1;
                debug!(session_id = %self.session_id, "Empty decode, requesting manual entry");
                self.emit(ScanOutcome::ManualEntryRequested);
                return;
            }
        };

        if self.resolving {
            self.scans_dropped += 1;
            debug!(
                session_id = %self.session_id,
                barcode = %barcode,
                "Lookup already in flight, dropping submission"
            );
            return;
        }

        self.scans_submitted += 1;
        self.resolving = true;

        let resolver = self.resolver.clone();
        let done_tx = self.done_tx.clone();
        let timeout = self.options.lookup_timeout;
        let session_id = self.session_id;

        // The lookup runs off the command loop so toggles and manual-entry
        // requests stay responsive while the network call is outstanding.
        tokio::spawn(async move {
            let done = Self::lookup(session_id, resolver, &barcode, timeout).await;
            // If the session was torn down meanwhile there is no receiver;
            // the outcome is discarded here, at the publication boundary.
            let _ = done_tx.send(done).await;
        });
    }

    /// Performs one bounded lookup and maps the result to an outcome.
    async fn lookup(
        session_id: Uuid,
        resolver: Arc<dyn ProductResolver>,
        barcode: &str,
        timeout: Duration,
    ) -> LookupDone {
        info!(session_id = %session_id, barcode = %barcode, "Resolving barcode");

        match tokio::time::timeout(timeout, resolver.resolve(barcode)).await {
            Ok(Ok(Some(product))) => {
                info!(session_id = %session_id, barcode = %barcode, name = %product.name, "Product found");
                LookupDone {
                    outcome: ScanOutcome::Found(product),
                    error_detail: None,
                }
            }
            Ok(Ok(None)) => {
                info!(session_id = %session_id, barcode = %barcode, "No product for barcode");
                LookupDone {
                    outcome: ScanOutcome::NotFound,
                    error_detail: None,
                }
            }
            Ok(Err(e)) => {
                warn!(session_id = %session_id, barcode = %barcode, error = %e, "Lookup failed");
                LookupDone {
                    outcome: ScanOutcome::ConnectionError,
                    error_detail: Some(e.to_string()),
                }
            }
            Err(_) => {
                let e = SessionError::Timeout(timeout.as_secs());
                warn!(session_id = %session_id, barcode = %barcode, error = %e, "Lookup timed out");
                LookupDone {
                    outcome: ScanOutcome::ConnectionError,
                    error_detail: Some(e.to_string()),
                }
            }
        }
    }

    /// Publishes one outcome to current subscribers.
    fn emit(&mut self, outcome: ScanOutcome) {
        self.last_outcome = Some(outcome.kind());
        info!(session_id = %self.session_id, outcome = outcome.kind(), "Scan outcome");
        // No subscribers is fine; outcomes are fire-once events
        let _ = self.outcome_tx.send(outcome);
    }

    fn status_snapshot(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.session_id.to_string(),
            started_at: self.started_at,
            resolving: self.resolving,
            scans_submitted: self.scans_submitted,
            scans_dropped: self.scans_dropped,
            last_outcome: self.last_outcome.map(str::to_string),
            last_error: self.last_error.clone(),
        }
    }
}

/// Which configuration field a toggle command targets.
enum Toggle {
    AutoFocus,
    Flash,
    Facing,
}

// =============================================================================
// Unit Tests
// =============================================================================
