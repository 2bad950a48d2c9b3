use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::paths::credentials_path;

// --- Credentials ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: &str, secret: &str) -> Self {
        Self {
            key: key.to_string(),
            secret: secret.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }

    /// `Authorization` header value for HTTP Basic auth. Empty credentials
    /// still encode (base64 of ":"), matching the wire behavior of the API.
    pub fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.key, self.secret);
        format!("Basic {}", BASE64.encode(raw))
    }
}

// --- Store abstraction ---
//
// The cache is plaintext at rest and last-write-wins across instances.

pub trait CredentialStore {
    fn load(&self) -> Result<Credentials, String>;
    fn save(&self, credentials: &Credentials) -> Result<(), String>;
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Result<Self, String> {
        let path = credentials_path().ok_or("Could not resolve state directory")?;
        Ok(Self::new(path))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Credentials, String> {
        if !self.path.exists() {
            return Ok(Credentials::default());
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read credential cache: {}", e))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse credential cache: {}", e))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create state directory: {}", e))?;
        }
        let json = serde_json::to_string_pretty(credentials)
            .map_err(|e| format!("Failed to serialize credentials: {}", e))?;
        fs::write(&self.path, json)
            .map_err(|e| format!("Failed to write credential cache: {}", e))
    }
}

/// Non-persistent store, mainly for tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Credentials>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Credentials, String> {
        Ok(self.inner.lock().expect("credential store poisoned").clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), String> {
        *self.inner.lock().expect("credential store poisoned") = credentials.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_encoding() {
        let creds = Credentials::new("abc", "123");
        assert_eq!(creds.basic_auth(), "Basic YWJjOjEyMw==");
    }

    #[test]
    fn test_basic_auth_empty_credentials() {
        let creds = Credentials::default();
        // base64(":")
        assert_eq!(creds.basic_auth(), "Basic Og==");
    }

    #[test]
    fn test_is_complete() {
        assert!(Credentials::new("k", "s").is_complete());
        assert!(!Credentials::new("k", "").is_complete());
        assert!(!Credentials::new("", "s").is_complete());
        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = std::env::temp_dir()
            .join("periscope-test")
            .join(format!("creds-{}.json", std::process::id()));
        let store = FileCredentialStore::new(path.clone());

        let creds = Credentials::new("key-1", "secret-1");
        store.save(&creds).unwrap();
        assert_eq!(store.load().unwrap(), creds);

        // Overwrite wholesale
        let next = Credentials::new("key-2", "secret-2");
        store.save(&next).unwrap();
        assert_eq!(store.load().unwrap(), next);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let store = FileCredentialStore::new(PathBuf::from("/nonexistent/periscope/creds.json"));
        assert_eq!(store.load().unwrap(), Credentials::default());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::default();
        assert_eq!(store.load().unwrap(), Credentials::default());
        store.save(&Credentials::new("k", "s")).unwrap();
        assert_eq!(store.load().unwrap(), Credentials::new("k", "s"));
    }
}
