use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::catalog::DEFAULT_BASE_URL;
use crate::snippet::SnippetLang;
use crate::storage::find_project_root;

// ---------------------------------------------------------------------------
// Top-level Config — all fields have defaults, unknown keys silently ignored.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub proxy: ProxyConfig,
    pub ssl: SslConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL prepended to every endpoint path. Individual catalog
    /// entries may still override it.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout in seconds. 0 = no timeout.
    pub timeout: u64,
    pub follow_redirects: bool,
    pub max_redirects: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub url: Option<String>,
    pub no_proxy: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub verify: bool,
    pub ca_cert: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub sidebar_width: u16,
    /// Snippet tab selected on startup: curl, python, or javascript.
    pub default_language: String,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            http: HttpConfig::default(),
            proxy: ProxyConfig::default(),
            ssl: SslConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            follow_redirects: true,
            max_redirects: 10,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: None,
            no_proxy: None,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self {
            verify: true,
            ca_cert: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sidebar_width: 32,
            default_language: "curl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Overlay config — partial deserialization for field-level merging.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayConfig {
    api: OverlayApiConfig,
    http: OverlayHttpConfig,
    proxy: OverlayProxyConfig,
    ssl: OverlaySslConfig,
    ui: OverlayUiConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayApiConfig {
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayHttpConfig {
    timeout: Option<u64>,
    follow_redirects: Option<bool>,
    max_redirects: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayProxyConfig {
    url: Option<String>,
    no_proxy: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlaySslConfig {
    verify: Option<bool>,
    ca_cert: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayUiConfig {
    sidebar_width: Option<u16>,
    default_language: Option<String>,
}

impl Config {
    /// Apply overlay values over self. Only `Some` fields are overridden.
    fn merge(mut self, overlay: OverlayConfig) -> Self {
        if let Some(v) = overlay.api.base_url {
            self.api.base_url = v;
        }
        if let Some(v) = overlay.http.timeout {
            self.http.timeout = v;
        }
        if let Some(v) = overlay.http.follow_redirects {
            self.http.follow_redirects = v;
        }
        if let Some(v) = overlay.http.max_redirects {
            self.http.max_redirects = v;
        }
        if let Some(v) = overlay.proxy.url {
            self.proxy.url = Some(v);
        }
        if let Some(v) = overlay.proxy.no_proxy {
            self.proxy.no_proxy = Some(v);
        }
        if let Some(v) = overlay.ssl.verify {
            self.ssl.verify = v;
        }
        if let Some(v) = overlay.ssl.ca_cert {
            self.ssl.ca_cert = Some(v);
        }
        if let Some(v) = overlay.ui.sidebar_width {
            self.ui.sidebar_width = v;
        }
        if let Some(v) = overlay.ui.default_language {
            self.ui.default_language = v;
        }
        self
    }

    pub fn default_language(&self) -> SnippetLang {
        SnippetLang::from_name(&self.ui.default_language).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

const CONFIG_DIR_NAME: &str = "periscope";
const CONFIG_FILE_NAME: &str = "config.toml";

fn global_config_path() -> Option<PathBuf> {
    if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir).join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn project_config_path() -> Option<PathBuf> {
    let root = find_project_root()?;
    let path = root.join(".periscope").join(CONFIG_FILE_NAME);
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tilde expansion
// ---------------------------------------------------------------------------

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(rest) = s.strip_prefix('~') {
            if let Ok(home) = env::var("HOME") {
                return PathBuf::from(home).join(rest.strip_prefix('/').unwrap_or(rest));
            }
        }
    }
    path.clone()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ConfigError {
    pub messages: Vec<String>,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for msg in &self.messages {
            writeln!(f, "{}", msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if reqwest::Url::parse(&self.api.base_url).is_err() {
            errors.push(format!(
                "config error: api.base_url = \"{}\" is not a valid URL",
                self.api.base_url
            ));
        }
        if self.api.base_url.ends_with('/') {
            errors.push(
                "config error: api.base_url must not end with a slash (endpoint paths start with one)"
                    .to_string(),
            );
        }
        if self.http.timeout > 600 {
            errors.push(format!(
                "config error: http.timeout = {} is out of range (0..=600)",
                self.http.timeout
            ));
        }
        if self.http.max_redirects > 100 {
            errors.push(format!(
                "config error: http.max_redirects = {} is out of range (0..=100)",
                self.http.max_redirects
            ));
        }
        if !(28..=60).contains(&self.ui.sidebar_width) {
            errors.push(format!(
                "config error: ui.sidebar_width = {} is out of range (28..=60)",
                self.ui.sidebar_width
            ));
        }
        if SnippetLang::from_name(&self.ui.default_language).is_none() {
            errors.push(format!(
                "config error: ui.default_language = \"{}\" must be curl, python, or javascript",
                self.ui.default_language
            ));
        }

        if let Some(ref url) = self.proxy.url {
            if reqwest::Url::parse(url).is_err() {
                errors.push(format!(
                    "config error: proxy.url = \"{}\" is not a valid URL",
                    url
                ));
            }
        }

        if let Some(ref path) = self.ssl.ca_cert {
            let expanded = expand_tilde(path);
            if !expanded.exists() {
                errors.push(format!(
                    "config error: ssl.ca_cert = \"{}\" — file not found",
                    expanded.display()
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { messages: errors })
        }
    }

    /// Expand tilde in all path fields. Called after merging, before validation.
    fn expand_paths(&mut self) {
        if let Some(ref path) = self.ssl.ca_cert {
            self.ssl.ca_cert = Some(expand_tilde(path));
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_overlay(path: &PathBuf) -> Result<OverlayConfig, String> {
    let content = fs::read_to_string(path).map_err(|e| {
        format!(
            "config error: could not read \"{}\": {}",
            path.display(),
            e
        )
    })?;
    toml::from_str(&content).map_err(|e| {
        format!(
            "config error: failed to parse \"{}\": {}",
            path.display(),
            e
        )
    })
}

/// Load configuration from global and project config files.
/// Missing files are silently skipped (all defaults apply).
/// Parse or validation errors are returned as `Err`.
pub fn load_config() -> Result<Config, String> {
    let mut config = Config::default();

    // Global config layer
    if let Some(path) = global_config_path() {
        if path.exists() {
            let overlay = load_overlay(&path)?;
            config = config.merge(overlay);
        }
    }

    // Project config layer
    if let Some(path) = project_config_path() {
        let overlay = load_overlay(&path)?;
        config = config.merge(overlay);
    }

    config.expand_paths();
    config.validate().map_err(|e| e.to_string())?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
