//! # Scanner Preferences
//!
//! Durable storage for the four scanner settings.
//!
//! ## Preference Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Preference Flow                                    │
//! │                                                                         │
//! │  Session start:                                                         │
//! │    PreferenceStore ──► read 4 fields ──► initial ScannerConfig          │
//! │                                                                         │
//! │  Toggle:                                                                │
//! │    new value ──► set_…() ISSUED FIRST ──► config published              │
//! │                                                                         │
//! │  Store failure:                                                         │
//! │    read  → per-field default + warn (session continues)                 │
//! │    write → warn, publication still proceeds                             │
//! │                                                                         │
//! │  File format (scanner.toml in the platform config directory):           │
//! │    ml_decoder_enabled = false                                           │
//! │    facing = "back"                                                      │
//! │    auto_focus_enabled = true                                            │
//! │    flash_enabled = false                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No other writer is assumed to run concurrently with a session, so there is
//! no cross-process locking; a single session's writes are ordered by the
//! interior mutex.

use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use shelfscan_core::{CameraFacing, ScannerConfig};

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Preference Store Contract
// =============================================================================

/// Durable key-value store for the four scanner settings.
///
/// Each call is synchronous from the session's point of view: the session
/// awaits completion before publishing the corresponding configuration
/// change. Ordering, not durability, is the contract.
pub trait PreferenceStore: Send + Sync {
    /// Reads the auto-focus preference.
    fn auto_focus(&self) -> SessionResult<bool>;

    /// Writes the auto-focus preference.
    fn set_auto_focus(&self, value: bool) -> SessionResult<()>;

    /// Reads the flash preference.
    fn flash(&self) -> SessionResult<bool>;

    /// Writes the flash preference.
    fn set_flash(&self, value: bool) -> SessionResult<()>;

    /// Reads the camera facing preference.
    fn facing(&self) -> SessionResult<CameraFacing>;

    /// Writes the camera facing preference.
    fn set_facing(&self, value: CameraFacing) -> SessionResult<()>;

    /// Reads the decoder backend preference.
    fn ml_decoder(&self) -> SessionResult<bool>;

    /// Writes the decoder backend preference.
    fn set_ml_decoder(&self, value: bool) -> SessionResult<()>;
}

// =============================================================================
// TOML-Backed Store
// =============================================================================

/// On-disk representation of the preference file.
///
/// Every field carries a serde default so a file written by an older build
/// (or a hand-edited partial file) still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default)]
    ml_decoder_enabled: bool,

    #[serde(default)]
    facing: CameraFacing,

    #[serde(default = "default_auto_focus")]
    auto_focus_enabled: bool,

    #[serde(default)]
    flash_enabled: bool,
}

fn default_auto_focus() -> bool {
    true
}

impl Default for PrefsFile {
    fn default() -> Self {
        let config = ScannerConfig::default();
        PrefsFile {
            ml_decoder_enabled: config.ml_decoder_enabled,
            facing: config.facing,
            auto_focus_enabled: config.auto_focus_enabled,
            flash_enabled: config.flash_enabled,
        }
    }
}

/// Preference store backed by a TOML file in the platform config directory.
///
/// The file is read once at open; setters update the cached copy and rewrite
/// the whole file.
pub struct TomlPreferenceStore {
    /// Path of the preference file.
    path: PathBuf,

    /// Cached file contents. The mutex orders writes within one session.
    cached: Mutex<PrefsFile>,
}

impl TomlPreferenceStore {
    /// Opens the store at the default platform location
    /// (e.g., `~/.config/shelfscan/scanner.toml` on Linux).
    pub fn open_default() -> SessionResult<Self> {
        let dirs = ProjectDirs::from("org", "shelfscan", "shelfscan")
            .ok_or(SessionError::NoConfigDir)?;
        Self::open(dirs.config_dir().join("scanner.toml"))
    }

    /// Opens the store at an explicit path.
    ///
    /// A missing file is not an error: the store starts from defaults and
    /// creates the file on first write.
    pub fn open(path: PathBuf) -> SessionResult<Self> {
        let cached = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let prefs: PrefsFile = toml::from_str(&contents)?;
            info!(?path, "Loaded scanner preferences");
            prefs
        } else {
            debug!(?path, "Preference file not found, using defaults");
            PrefsFile::default()
        };

        Ok(TomlPreferenceStore {
            path,
            cached: Mutex::new(cached),
        })
    }

    /// Reads one field out of the cache.
    fn read<T>(&self, get: impl FnOnce(&PrefsFile) -> T) -> SessionResult<T> {
        let cached = self
            .cached
            .lock()
            .map_err(|_| SessionError::PrefsLoadFailed("preference lock poisoned".into()))?;
        Ok(get(&cached))
    }

    /// Updates one field and rewrites the file.
    fn write(&self, set: impl FnOnce(&mut PrefsFile)) -> SessionResult<()> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| SessionError::PrefsSaveFailed("preference lock poisoned".into()))?;
        set(&mut cached);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::PrefsSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(&*cached)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| SessionError::PrefsSaveFailed(e.to_string()))?;

        debug!(path = ?self.path, "Scanner preferences saved");
        Ok(())
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn auto_focus(&self) -> SessionResult<bool> {
        self.read(|p| p.auto_focus_enabled)
    }

    fn set_auto_focus(&self, value: bool) -> SessionResult<()> {
        self.write(|p| p.auto_focus_enabled = value)
    }

    fn flash(&self) -> SessionResult<bool> {
        self.read(|p| p.flash_enabled)
    }

    fn set_flash(&self, value: bool) -> SessionResult<()> {
        self.write(|p| p.flash_enabled = value)
    }

    fn facing(&self) -> SessionResult<CameraFacing> {
        self.read(|p| p.facing)
    }

    fn set_facing(&self, value: CameraFacing) -> SessionResult<()> {
        self.write(|p| p.facing = value)
    }

    fn ml_decoder(&self) -> SessionResult<bool> {
        self.read(|p| p.ml_decoder_enabled)
    }

    fn set_ml_decoder(&self, value: bool) -> SessionResult<()> {
        self.write(|p| p.ml_decoder_enabled = value)
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-memory preference store.
///
/// Used in tests and as the fallback when the durable store cannot be opened
/// (the session must keep working on in-memory values, per the persistence
/// failure policy).
#[derive(Debug)]
pub struct MemoryPreferenceStore {
    config: Mutex<ScannerConfig>,
}

impl MemoryPreferenceStore {
    /// Creates a store seeded with defaults.
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    /// Creates a store seeded with an explicit configuration.
    pub fn with_config(config: ScannerConfig) -> Self {
        MemoryPreferenceStore {
            config: Mutex::new(config),
        }
    }

    /// Returns the currently stored configuration.
    pub fn snapshot(&self) -> SessionResult<ScannerConfig> {
        self.read(|c| *c)
    }

    fn read<T>(&self, get: impl FnOnce(&ScannerConfig) -> T) -> SessionResult<T> {
        let config = self
            .config
            .lock()
            .map_err(|_| SessionError::PrefsLoadFailed("preference lock poisoned".into()))?;
        Ok(get(&config))
    }

    fn write(&self, set: impl FnOnce(&mut ScannerConfig)) -> SessionResult<()> {
        let mut config = self
            .config
            .lock()
            .map_err(|_| SessionError::PrefsSaveFailed("preference lock poisoned".into()))?;
        set(&mut config);
        Ok(())
    }
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn auto_focus(&self) -> SessionResult<bool> {
        self.read(|c| c.auto_focus_enabled)
    }

    fn set_auto_focus(&self, value: bool) -> SessionResult<()> {
        self.write(|c| c.auto_focus_enabled = value)
    }

    fn flash(&self) -> SessionResult<bool> {
        self.read(|c| c.flash_enabled)
    }

    fn set_flash(&self, value: bool) -> SessionResult<()> {
        self.write(|c| c.flash_enabled = value)
    }

    fn facing(&self) -> SessionResult<CameraFacing> {
        self.read(|c| c.facing)
    }

    fn set_facing(&self, value: CameraFacing) -> SessionResult<()> {
        self.write(|c| c.facing = value)
    }

    fn ml_decoder(&self) -> SessionResult<bool> {
        self.read(|c| c.ml_decoder_enabled)
    }

    fn set_ml_decoder(&self, value: bool) -> SessionResult<()> {
        self.write(|c| c.ml_decoder_enabled = value)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Reads the full configuration from a store, substituting the field default
/// for any field that fails to load.
///
/// This is the session's startup policy for `ConfigurationPersistenceFailure`:
/// never crash, fall back per field and log.
pub(crate) fn load_config_or_defaults(store: &dyn PreferenceStore) -> ScannerConfig {
    let defaults = ScannerConfig::default();

    let ml_decoder_enabled = store.ml_decoder().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read decoder preference, using default");
        defaults.ml_decoder_enabled
    });
    let facing = store.facing().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read facing preference, using default");
        defaults.facing
    });
    let auto_focus_enabled = store.auto_focus().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read auto-focus preference, using default");
        defaults.auto_focus_enabled
    });
    let flash_enabled = store.flash().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read flash preference, using default");
        defaults.flash_enabled
    });

    ScannerConfig {
        ml_decoder_enabled,
        facing,
        auto_focus_enabled,
        flash_enabled,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_prefs_path() -> PathBuf {
        std::env::temp_dir().join(format!("shelfscan-prefs-{}.toml", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryPreferenceStore::new();
        assert!(store.auto_focus().unwrap());
        assert!(!store.flash().unwrap());

        store.set_flash(true).unwrap();
        store.set_facing(CameraFacing::Front).unwrap();

        assert!(store.flash().unwrap());
        assert_eq!(store.facing().unwrap(), CameraFacing::Front);
        // Untouched fields keep their values
        assert!(store.auto_focus().unwrap());
        assert!(!store.ml_decoder().unwrap());
    }

    #[test]
    fn test_toml_store_missing_file_uses_defaults() {
        let path = temp_prefs_path();
        let store = TomlPreferenceStore::open(path.clone()).unwrap();

        assert_eq!(load_config_or_defaults(&store), ScannerConfig::default());
        // No write happened yet, so no file either
        assert!(!path.exists());
    }

    #[test]
    fn test_toml_store_persists_across_reopen() {
        let path = temp_prefs_path();

        {
            let store = TomlPreferenceStore::open(path.clone()).unwrap();
            store.set_flash(true).unwrap();
            store.set_facing(CameraFacing::Front).unwrap();
            store.set_ml_decoder(true).unwrap();
        }

        let reopened = TomlPreferenceStore::open(path.clone()).unwrap();
        assert!(reopened.flash().unwrap());
        assert_eq!(reopened.facing().unwrap(), CameraFacing::Front);
        assert!(reopened.ml_decoder().unwrap());
        assert!(reopened.auto_focus().unwrap());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_toml_store_partial_file_fills_defaults() {
        let path = temp_prefs_path();
        std::fs::write(&path, "flash_enabled = true\n").unwrap();

        let store = TomlPreferenceStore::open(path.clone()).unwrap();
        assert!(store.flash().unwrap());
        assert!(store.auto_focus().unwrap()); // serde default
        assert_eq!(store.facing().unwrap(), CameraFacing::Back);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_config_matches_store_fields() {
        let seeded = ScannerConfig {
            ml_decoder_enabled: true,
            facing: CameraFacing::Front,
            auto_focus_enabled: false,
            flash_enabled: true,
        };
        let store = MemoryPreferenceStore::with_config(seeded);
        assert_eq!(load_config_or_defaults(&store), seeded);
    }
}
