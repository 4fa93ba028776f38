//! Credential storage
//!
//! The loader asks a [`CredentialStore`] for the bearer token before every
//! request. [`EncryptedFileStore`] keeps secrets encrypted with AES-256-GCM in
//! ~/.config/reelfeed/credentials.enc, with the key derived from
//! machine-specific identifiers. [`MemoryStore`] is for embedding and tests.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result, anyhow};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::paths;

const NONCE_SIZE: usize = 12;

/// Key-value source of secrets
pub trait CredentialStore {
    /// Look up a secret; `Ok(None)` when nothing is stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a secret under `key`, replacing any previous value
    fn set(&self, key: &str, secret: &str) -> Result<()>;

    /// Remove the secret under `key` (no-op if absent)
    fn delete(&self, key: &str) -> Result<()>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, secret: &str) -> Result<()> {
        (**self).set(key, secret)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one secret
    pub fn with_secret(key: &str, secret: &str) -> Self {
        let store = Self::new();
        store
            .secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), secret.to_string());
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let secrets = self.secrets.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(secrets.get(key).cloned())
    }

    fn set(&self, key: &str, secret: &str) -> Result<()> {
        let mut secrets = self.secrets.lock().unwrap_or_else(PoisonError::into_inner);
        secrets.insert(key.to_string(), secret.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut secrets = self.secrets.lock().unwrap_or_else(PoisonError::into_inner);
        secrets.remove(key);
        Ok(())
    }
}

/// Encrypted JSON map on disk: 12-byte nonce followed by the AES-GCM ciphertext
#[derive(Debug, Clone)]
pub struct EncryptedFileStore {
    path: PathBuf,
}

impl EncryptedFileStore {
    /// Store at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::at(paths::credentials_path()?))
    }

    /// Store at a specific path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cipher() -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&derive_key()).map_err(|_| anyhow!("Invalid key length"))
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let encrypted = fs::read(&self.path).context("Failed to read credentials file")?;
        if encrypted.len() < NONCE_SIZE {
            return Ok(HashMap::new());
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let plaintext = Self::cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| anyhow!("Failed to decrypt credentials"))?;

        let json = String::from_utf8(plaintext).context("Invalid UTF-8 in credentials")?;
        serde_json::from_str(&json).context("Malformed credentials file")
    }

    fn save(&self, secrets: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create credentials directory")?;
        }

        let json = serde_json::to_string(secrets)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce_bytes);

        let ciphertext = Self::cipher()?
            .encrypt(Nonce::from_slice(&nonce_bytes), json.as_bytes())
            .map_err(|_| anyhow!("Failed to encrypt credentials"))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);
        fs::write(&self.path, output).context("Failed to write credentials file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl CredentialStore for EncryptedFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, secret: &str) -> Result<()> {
        let mut secrets = self.load().unwrap_or_default();
        secrets.insert(key.to_string(), secret.to_string());
        self.save(&secrets)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut secrets = self.load().unwrap_or_default();
        if secrets.remove(key).is_some() {
            self.save(&secrets)?;
        }
        Ok(())
    }
}

/// Machine ID for key derivation
fn machine_id() -> String {
    #[cfg(target_os = "linux")]
    {
        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = fs::read_to_string(candidate) {
                return id.trim().to_string();
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(uuid) = stdout
                .lines()
                .find(|line| line.contains("IOPlatformUUID"))
                .and_then(|line| line.split('"').nth(3))
            {
                return uuid.to_string();
            }
        }
    }

    dirs::home_dir().map_or_else(
        || "reelfeed-fallback-key".to_string(),
        |p| p.to_string_lossy().to_string(),
    )
}

fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(machine_id().as_bytes());
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }
    hasher.update(b"reelfeed-credentials-v1");
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_secret("token", "abc");
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));

        store.delete("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_encrypted_round_trip() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::at(dir.path().join("credentials.enc"));

        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "s3cret").unwrap();
        store.set("other", "value").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("s3cret"));

        let raw = fs::read(store.path()).unwrap();
        assert!(!String::from_utf8_lossy(&raw).contains("s3cret"));

        store.delete("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.enc");
        fs::write(&path, vec![7u8; 64]).unwrap();

        assert!(EncryptedFileStore::at(&path).get("token").is_err());
    }
}
