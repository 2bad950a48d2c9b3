use reqwest::Client;
use serde::Deserialize;

use crate::catalog::DEVICE_LIST_PATH;
use crate::request::ACCEPT_JSON;
use crate::storage::Credentials;

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    pub identifier: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub system_title: Option<String>,
}

impl DeviceRecord {
    /// Human-readable name; devices without an assigned title fall back to
    /// their system title, then the identifier.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .or(self.system_title.as_deref())
            .unwrap_or(&self.identifier)
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name(), self.identifier)
    }
}

#[derive(Debug, Deserialize)]
struct DeviceListResponse {
    #[serde(default)]
    data: Vec<DeviceRecord>,
}

/// Fetch the caller's devices for the deviceId dropdown. Failures here are
/// never fatal; the form falls back to free-text input.
pub async fn fetch_devices(
    client: &Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<Vec<DeviceRecord>, String> {
    let url = format!("{}{}", base_url, DEVICE_LIST_PATH);
    let response = client
        .get(&url)
        .header("Authorization", credentials.basic_auth())
        .header("Accept", ACCEPT_JSON)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch devices: {}", e))?;

    if !response.status().is_success() {
        return Err(format!(
            "Device list request failed: {}",
            response.status().as_u16()
        ));
    }

    let list: DeviceListResponse = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse device list: {}", e))?;
    Ok(list.data)
}
