use std::env;
use std::path::PathBuf;

const PROJECT_MARKERS: &[&str] = &[".git", "Cargo.toml", "package.json", ".periscope"];
const STATE_DIR_NAME: &str = "periscope";
const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Walk up from the current directory looking for a project marker.
pub fn find_project_root() -> Option<PathBuf> {
    let current = env::current_dir().ok()?;
    let mut dir = current.as_path();

    loop {
        for marker in PROJECT_MARKERS {
            if dir.join(marker).exists() {
                return Some(dir.to_path_buf());
            }
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => return None,
        }
    }
}

fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var("XDG_STATE_HOME") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".local").join("state"))
}

/// Where the credential cache lives. Shared by every explorer instance.
pub fn credentials_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join(STATE_DIR_NAME).join(CREDENTIALS_FILE_NAME))
}
