//! Signing secret resolution and persistence.
//!
//! The HMAC secret backing every session, action, and login comparison is
//! resolved exactly once at startup, in this order:
//!
//! 1. `SIGNING_SECRET` from configuration (required for multi-instance
//!    deployments - the file fallback is per-instance)
//! 2. A previously persisted secret file, trimmed of surrounding whitespace
//! 3. A freshly generated 32-byte random value, persisted with owner-only
//!    permissions for reuse across restarts
//!
//! Persistence failure is non-fatal: the process keeps the generated secret
//! in memory and logs a warning. Sessions then die with the process, which
//! is an acceptable degraded mode.

use std::fs;
use std::io::Write;
use std::path::Path;

use rand::Rng;
use tracing::{info, warn};

/// Recommended minimum secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Process-wide signing secret, resolved once and injected into the codecs.
///
/// Deliberately not a module-level singleton: the single owner constructs it
/// at startup and hands it (behind `Arc`) to each component that signs or
/// verifies, which keeps the codecs trivially testable with throwaway keys.
#[derive(Clone)]
pub struct SigningSecret {
    bytes: Vec<u8>,
    ephemeral: bool,
}

impl SigningSecret {
    /// Resolve the signing secret from configuration, file, or generation.
    ///
    /// Never fails: every fallback ends in a usable in-memory secret. The
    /// only unrecoverable case is OS RNG failure, which panics inside `rand`
    /// before the process serves traffic.
    pub fn resolve(configured: Option<&str>, secret_file: &Path) -> Self {
        if let Some(secret) = configured {
            info!("Using externally configured signing secret");
            if secret.len() < MIN_SECRET_BYTES {
                warn!(
                    len = secret.len(),
                    min = MIN_SECRET_BYTES,
                    "Configured signing secret is shorter than recommended"
                );
            }
            return Self {
                bytes: secret.as_bytes().to_vec(),
                ephemeral: false,
            };
        }

        if let Ok(contents) = fs::read_to_string(secret_file) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                info!(path = %secret_file.display(), "Loaded signing secret from file");
                return Self {
                    bytes: trimmed.as_bytes().to_vec(),
                    ephemeral: false,
                };
            }
        }

        let generated = generate_secret();
        match persist_secret(secret_file, &generated) {
            Ok(()) => {
                info!(path = %secret_file.display(), "Generated and persisted new signing secret");
                Self {
                    bytes: generated.into_bytes(),
                    ephemeral: false,
                }
            }
            Err(e) => {
                warn!(
                    path = %secret_file.display(),
                    error = %e,
                    "Could not persist signing secret; sessions will not survive a restart"
                );
                Self {
                    bytes: generated.into_bytes(),
                    ephemeral: true,
                }
            }
        }
    }

    /// Construct a secret directly from bytes (tests, embedding).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            ephemeral: true,
        }
    }

    /// Raw key material for HMAC operations.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True when the secret only lives in this process's memory.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl std::fmt::Debug for SigningSecret {
    // Key material must never reach logs, even via {:?}.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("len", &self.bytes.len())
            .field("ephemeral", &self.ephemeral)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh 32-byte secret, hex-encoded for safe file storage.
fn generate_secret() -> String {
    let mut raw = [0u8; MIN_SECRET_BYTES];
    rand::rng().fill(raw.as_mut_slice());
    hex::encode(raw)
}

/// Write the secret to disk with owner-only permissions.
fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(secret.as_bytes())?;
    Ok(())
}
