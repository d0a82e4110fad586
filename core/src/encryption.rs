use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Encryption modes accepted by `borg init --encryption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionScheme {
    /// No encryption, no authentication.
    None,
    /// SHA-256 HMAC, no cipher.
    Authenticated,
    /// BLAKE2b-256 HMAC, no cipher.
    AuthenticatedBlake2,
    /// SHA-256 HMAC and AES-CTR-256, key stored in the repository behind a passphrase.
    Repokey,
    /// SHA-256 HMAC and AES-CTR-256, key stored outside the repository.
    Keyfile,
    /// BLAKE2b-256 variant of `Repokey`.
    RepokeyBlake2,
    /// BLAKE2b-256 variant of `Keyfile`.
    KeyfileBlake2,
}

impl EncryptionScheme {
    pub const ALL: [EncryptionScheme; 7] = [
        EncryptionScheme::None,
        EncryptionScheme::Authenticated,
        EncryptionScheme::AuthenticatedBlake2,
        EncryptionScheme::Repokey,
        EncryptionScheme::Keyfile,
        EncryptionScheme::RepokeyBlake2,
        EncryptionScheme::KeyfileBlake2,
    ];

    /// The token borg expects after `--encryption=`.
    pub fn as_flag(&self) -> &'static str {
        match self {
            EncryptionScheme::None => "none",
            EncryptionScheme::Authenticated => "authenticated",
            EncryptionScheme::AuthenticatedBlake2 => "authenticated-blake2",
            EncryptionScheme::Repokey => "repokey",
            EncryptionScheme::Keyfile => "keyfile",
            EncryptionScheme::RepokeyBlake2 => "repokey-blake2",
            EncryptionScheme::KeyfileBlake2 => "keyfile-blake2",
        }
    }

    pub fn requires_passphrase(&self) -> bool {
        matches!(
            self,
            EncryptionScheme::Repokey | EncryptionScheme::RepokeyBlake2
        )
    }
}

impl fmt::Display for EncryptionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

impl FromStr for EncryptionScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EncryptionScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_flag() == s)
            .ok_or_else(|| Error::InvalidArgumentType {
                argument: "encryption",
                reason: format!("unknown encryption mode '{}'", s),
            })
    }
}

/// An encryption scheme paired with the secret it needs, if any.
///
/// Passphrase schemes (`repokey`, `repokey-blake2`) need a non-empty secret;
/// every other scheme must come without one. The pairing is checked by
/// [`EncryptionSelection::validate`], which `init` runs before spawning borg.
#[derive(Clone)]
pub struct EncryptionSelection {
    scheme: EncryptionScheme,
    secret: Option<Zeroizing<String>>,
}

impl EncryptionSelection {
    pub fn new(scheme: EncryptionScheme, secret: Option<&str>) -> Self {
        Self {
            scheme,
            secret: secret.map(|s| Zeroizing::new(s.to_string())),
        }
    }

    pub fn unencrypted() -> Self {
        Self::new(EncryptionScheme::None, None)
    }

    pub fn repokey(passphrase: &str) -> Self {
        Self::new(EncryptionScheme::Repokey, Some(passphrase))
    }

    pub fn scheme(&self) -> EncryptionScheme {
        self.scheme
    }

    /// The secret, with an empty string treated as absent.
    pub fn passphrase(&self) -> Option<&str> {
        self.secret
            .as_deref()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        match (self.scheme.requires_passphrase(), self.passphrase()) {
            (true, None) => Err(Error::MalformedEncryption {
                scheme: self.scheme,
                reason: "a non-empty passphrase is required".to_string(),
            }),
            (false, Some(_)) => Err(Error::MalformedEncryption {
                scheme: self.scheme,
                reason: "this mode takes no secret".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for EncryptionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionSelection")
            .field("scheme", &self.scheme)
            .field("secret", &self.passphrase().map(|_| "<redacted>"))
            .finish()
    }
}
