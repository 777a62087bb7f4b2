//! Encryption metadata carried by field descriptors.
//!
//! A field may declare an encryption backend and a secret. The descriptor
//! only carries this configuration; the persistence layer resolves the
//! backend with [`EncryptionConfig::resolve_backend`] and applies it when
//! values cross the storage boundary.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use modelforge_core::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Which encryption backend a field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptBackendKind {
    /// Stored as plaintext.
    #[default]
    None,
    /// One-way keyed hash ([`HashBackend`]).
    Hash,
    /// A caller-supplied [`EncryptBackend`] implementation.
    Custom,
}

impl fmt::Display for EncryptBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Hash => write!(f, "hash"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Transforms plaintext into its stored representation and back.
pub trait EncryptBackend: Send + Sync + fmt::Debug {
    /// A short backend name for diagnostics.
    fn name(&self) -> &str;

    /// Produces the stored representation of `plaintext`.
    fn encrypt(&self, plaintext: &str) -> ModelResult<String>;

    /// Recovers plaintext from its stored representation.
    ///
    /// One-way backends return the input unchanged.
    fn decrypt(&self, ciphertext: &str) -> ModelResult<String>;
}

/// One-way HMAC-SHA256 backend keyed by the field secret.
///
/// Output is standard base64. Suited to values that are only ever compared,
/// such as passwords.
pub struct HashBackend {
    key: Vec<u8>,
}

impl HashBackend {
    /// Creates a backend keyed by `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for HashBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashBackend").finish_non_exhaustive()
    }
}

impl EncryptBackend for HashBackend {
    fn name(&self) -> &str {
        "hash"
    }

    fn encrypt(&self, plaintext: &str) -> ModelResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key size");
        mac.update(plaintext.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn decrypt(&self, ciphertext: &str) -> ModelResult<String> {
        Ok(ciphertext.to_string())
    }
}

/// Encryption configuration of one field.
///
/// Built by the field factory from `encrypt_backend`, `encrypt_secret`, and
/// `encrypt_custom_backend`. The secret and custom backend are carried as
/// given.
#[derive(Clone)]
pub struct EncryptionConfig {
    backend: EncryptBackendKind,
    secret: String,
    custom_backend: Option<Arc<dyn EncryptBackend>>,
}

impl EncryptionConfig {
    /// Validates the encryption options of a field.
    ///
    /// Returns `Ok(None)` when no backend (or `None`) is declared.
    pub(crate) fn from_options(
        kind_name: &str,
        backend: Option<EncryptBackendKind>,
        secret: Option<String>,
        custom_backend: Option<Arc<dyn EncryptBackend>>,
        primary_key: bool,
    ) -> ModelResult<Option<Self>> {
        let backend = backend.unwrap_or_default();
        if backend == EncryptBackendKind::None {
            return Ok(None);
        }
        if primary_key {
            return Err(ModelError::definition(format!(
                "Primary key field {kind_name} cannot be encrypted"
            )));
        }
        let secret = match secret {
            Some(s) if !s.is_empty() => s,
            _ => {
                return Err(ModelError::definition(format!(
                    "Parameter encrypt_secret is required for encrypted field {kind_name}"
                )))
            }
        };
        if backend == EncryptBackendKind::Custom && custom_backend.is_none() {
            return Err(ModelError::definition(format!(
                "Parameter encrypt_custom_backend is required for field {kind_name} with a custom encrypt backend"
            )));
        }
        Ok(Some(Self {
            backend,
            secret,
            custom_backend,
        }))
    }

    /// Returns the backend kind.
    pub const fn backend(&self) -> EncryptBackendKind {
        self.backend
    }

    /// Returns the secret exactly as declared.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Returns the custom backend, if one was supplied.
    pub fn custom_backend(&self) -> Option<&Arc<dyn EncryptBackend>> {
        self.custom_backend.as_ref()
    }

    /// Returns the backend implementation the persistence layer should use.
    pub fn resolve_backend(&self) -> ModelResult<Arc<dyn EncryptBackend>> {
        match self.backend {
            EncryptBackendKind::Hash => Ok(Arc::new(HashBackend::new(&self.secret))),
            EncryptBackendKind::Custom => self.custom_backend.clone().ok_or_else(|| {
                ModelError::Configuration("custom encrypt backend is missing".to_string())
            }),
            EncryptBackendKind::None => Err(ModelError::Configuration(
                "field is not encrypted".to_string(),
            )),
        }
    }
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("backend", &self.backend)
            .field("secret", &"<redacted>")
            .field("custom_backend", &self.custom_backend)
            .finish()
    }
}
