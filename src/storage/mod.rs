mod credentials;
mod paths;

pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use paths::find_project_root;
