use std::fs;
use std::time::{Duration, Instant};

use reqwest::{redirect, Certificate, Client, NoProxy, Proxy};
use serde_json::Value;

use crate::catalog::HttpMethod;
use crate::config::Config;
use crate::request::ResolvedRequest;

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Parsed body, when the server returned JSON. Kept even for error
    /// statuses so the payload can be shown for debugging.
    pub json: Option<Value>,
    pub duration_ms: u64,
}

impl ResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body text for display: pretty-printed JSON when parseable,
    /// otherwise the raw text.
    pub fn display_body(&self) -> String {
        match &self.json {
            Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| self.body.clone()),
            None => self.body.clone(),
        }
    }
}

/// Build the shared client from configuration. Called once at startup.
pub fn build_client(config: &Config) -> Result<Client, String> {
    let mut builder = Client::builder();

    if config.http.timeout > 0 {
        builder = builder.timeout(Duration::from_secs(config.http.timeout));
    }

    builder = if config.http.follow_redirects {
        builder.redirect(redirect::Policy::limited(config.http.max_redirects as usize))
    } else {
        builder.redirect(redirect::Policy::none())
    };

    if let Some(url) = &config.proxy.url {
        let mut proxy = Proxy::all(url.as_str()).map_err(|e| format!("Invalid proxy url: {}", e))?;
        if let Some(no_proxy) = &config.proxy.no_proxy {
            proxy = proxy.no_proxy(NoProxy::from_string(no_proxy));
        }
        builder = builder.proxy(proxy);
    }

    if !config.ssl.verify {
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(path) = &config.ssl.ca_cert {
        let pem = fs::read(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let cert = Certificate::from_pem(&pem)
            .map_err(|e| format!("Invalid CA certificate {}: {}", path.display(), e))?;
        builder = builder.add_root_certificate(cert);
    }

    builder
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Issue the resolved request. Transport failures come back as `Err`;
/// an HTTP response of any status comes back as `Ok` — classifying
/// non-success statuses is the caller's concern.
pub async fn execute(client: &Client, request: &ResolvedRequest) -> Result<ResponseData, String> {
    let start = Instant::now();

    let mut builder = client.request(to_reqwest_method(request.method), &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }

    let response = builder.send().await.map_err(format_request_error)?;

    let status = response.status();
    let status_code = status.as_u16();
    let status_text = status.canonical_reason().unwrap_or("").to_string();

    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    let body = response.text().await.map_err(|e| e.to_string())?;
    let json = serde_json::from_str(&body).ok();

    Ok(ResponseData {
        status: status_code,
        status_text,
        headers,
        body,
        json,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn format_request_error(err: reqwest::Error) -> String {
    if err.is_timeout() {
        return "Request timed out".to_string();
    }
    if err.is_connect() {
        let host = err
            .url()
            .and_then(|url| url.host_str())
            .map(str::to_string);
        return match host {
            Some(host) => format!("Connection failed: {}", host),
            None => "Connection failed".to_string(),
        };
    }
    if err.is_builder() {
        return format!("Invalid request: {}", err);
    }
    if err.is_redirect() {
        return "Too many redirects".to_string();
    }
    if err.is_decode() {
        return "Failed to decode response body".to_string();
    }
    format!("Request failed: {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ResponseData {
        ResponseData {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.to_string(),
            json: serde_json::from_str(body).ok(),
            duration_ms: 0,
        }
    }

    #[test]
    fn test_is_success_range() {
        assert!(response(200, "{}").is_success());
        assert!(response(204, "").is_success());
        assert!(!response(301, "").is_success());
        assert!(!response(404, "{}").is_success());
        assert!(!response(500, "").is_success());
    }

    #[test]
    fn test_json_parsed_for_error_status() {
        let data = response(404, r#"{"error":"not found"}"#);
        assert_eq!(data.json, Some(serde_json::json!({"error": "not found"})));
    }

    #[test]
    fn test_display_body_pretty_prints_json() {
        let data = response(200, r#"{"a":1}"#);
        assert_eq!(data.display_body(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_display_body_falls_back_to_raw() {
        let data = response(200, "plain text");
        assert_eq!(data.json, None);
        assert_eq!(data.display_body(), "plain text");
    }

    #[test]
    fn test_build_client_defaults() {
        build_client(&Config::default()).unwrap();
    }
}
