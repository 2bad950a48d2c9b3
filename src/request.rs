use std::collections::HashMap;

use crate::catalog::{EndpointSpec, HttpMethod, ParamLocation};
use crate::storage::Credentials;

pub const ACCEPT_JSON: &str = "application/json";

/// Concrete request derived from an endpoint template plus current input.
/// Recomputed on every render; building is pure and never touches the
/// network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ResolvedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Derive the full request from user-entered values.
///
/// Path placeholders with no value stay literally in the URL so the user
/// can see what is missing; query parameters with empty values are dropped
/// outright. The body text is passed through untouched.
pub fn build_request(
    base_url: &str,
    endpoint: &EndpointSpec,
    values: &HashMap<String, String>,
    body_text: &str,
    credentials: &Credentials,
) -> ResolvedRequest {
    let mut url = format!("{}{}", base_url, endpoint.path);

    for param in endpoint.params_at(ParamLocation::Path) {
        if let Some(value) = values.get(&param.name) {
            if !value.is_empty() {
                url = url.replace(&format!("{{{}}}", param.name), value);
            }
        }
    }

    let query: Vec<String> = endpoint
        .params_at(ParamLocation::Query)
        .filter_map(|param| {
            values
                .get(&param.name)
                .filter(|value| !value.is_empty())
                .map(|value| format!("{}={}", param.name, urlencoding::encode(value)))
        })
        .collect();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }

    let body = if endpoint.method.sends_body() && !body_text.is_empty() {
        Some(body_text.to_string())
    } else {
        None
    };

    let mut headers = vec![("Accept".to_string(), ACCEPT_JSON.to_string())];
    if endpoint.requires_auth {
        headers.push(("Authorization".to_string(), credentials.basic_auth()));
    }
    if body.is_some() {
        headers.push(("Content-Type".to_string(), ACCEPT_JSON.to_string()));
    }
    for param in endpoint.params_at(ParamLocation::Header) {
        if let Some(value) = values.get(&param.name) {
            if !value.is_empty() {
                headers.push((param.name.clone(), value.clone()));
            }
        }
    }

    ResolvedRequest {
        method: endpoint.method,
        url,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ParameterDescriptor;

    const BASE: &str = "https://cloud.mybox.pro/admin-panel/v1";

    fn param(name: &str, location: ParamLocation) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.to_string(),
            location,
            required: false,
            description: String::new(),
            example: None,
            allowed_values: None,
        }
    }

    fn endpoint(method: HttpMethod, path: &str, params: Vec<ParameterDescriptor>) -> EndpointSpec {
        EndpointSpec {
            id: "test".to_string(),
            title: "Test".to_string(),
            description: String::new(),
            method,
            path: path.to_string(),
            parameters: params,
            body_example: None,
            response_example: None,
            requires_auth: true,
            base_url: None,
            device_autofill: false,
        }
    }

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_path_param_substituted() {
        let endpoint = endpoint(
            HttpMethod::Get,
            "/device/{deviceId}",
            vec![param("deviceId", ParamLocation::Path)],
        );
        let request = build_request(
            BASE,
            &endpoint,
            &values(&[("deviceId", "ABC123")]),
            "",
            &Credentials::new("k", "s"),
        );
        assert_eq!(request.url, format!("{}/device/ABC123", BASE));
    }

    #[test]
    fn test_empty_path_param_keeps_placeholder() {
        let endpoint = endpoint(
            HttpMethod::Get,
            "/device/{deviceId}",
            vec![param("deviceId", ParamLocation::Path)],
        );
        let request = build_request(BASE, &endpoint, &HashMap::new(), "", &Credentials::default());
        assert_eq!(request.url, format!("{}/device/{{deviceId}}", BASE));

        let request = build_request(
            BASE,
            &endpoint,
            &values(&[("deviceId", "")]),
            "",
            &Credentials::default(),
        );
        assert_eq!(request.url, format!("{}/device/{{deviceId}}", BASE));
    }

    #[test]
    fn test_empty_query_param_omitted() {
        let endpoint = endpoint(
            HttpMethod::Get,
            "/device",
            vec![
                param("page", ParamLocation::Query),
                param("limit", ParamLocation::Query),
            ],
        );
        let request = build_request(
            BASE,
            &endpoint,
            &values(&[("page", "2"), ("limit", "")]),
            "",
            &Credentials::default(),
        );
        assert_eq!(request.url, format!("{}/device?page=2", BASE));
        assert!(!request.url.contains("limit"));
    }

    #[test]
    fn test_no_query_string_when_all_empty() {
        let endpoint = endpoint(
            HttpMethod::Get,
            "/device",
            vec![param("page", ParamLocation::Query)],
        );
        let request = build_request(BASE, &endpoint, &HashMap::new(), "", &Credentials::default());
        assert!(!request.url.contains('?'));
    }

    #[test]
    fn test_query_value_percent_encoded() {
        let endpoint = endpoint(
            HttpMethod::Get,
            "/device",
            vec![param("search", ParamLocation::Query)],
        );
        let request = build_request(
            BASE,
            &endpoint,
            &values(&[("search", "rooftop sensor&more")]),
            "",
            &Credentials::default(),
        );
        assert_eq!(
            request.url,
            format!("{}/device?search=rooftop%20sensor%26more", BASE)
        );
    }

    #[test]
    fn test_basic_auth_header() {
        let endpoint = endpoint(HttpMethod::Get, "/device", vec![]);
        let request = build_request(
            BASE,
            &endpoint,
            &HashMap::new(),
            "",
            &Credentials::new("abc", "123"),
        );
        assert_eq!(request.header("Authorization"), Some("Basic YWJjOjEyMw=="));
    }

    #[test]
    fn test_no_auth_header_when_not_required() {
        let mut endpoint = endpoint(HttpMethod::Get, "/status", vec![]);
        endpoint.requires_auth = false;
        let request = build_request(
            BASE,
            &endpoint,
            &HashMap::new(),
            "",
            &Credentials::new("abc", "123"),
        );
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn test_accept_header_always_present() {
        let endpoint = endpoint(HttpMethod::Get, "/device", vec![]);
        let request = build_request(BASE, &endpoint, &HashMap::new(), "", &Credentials::default());
        assert_eq!(request.header("Accept"), Some("application/json"));
    }

    #[test]
    fn test_content_type_only_with_body() {
        let endpoint = endpoint(HttpMethod::Post, "/device", vec![]);

        let without_body =
            build_request(BASE, &endpoint, &HashMap::new(), "", &Credentials::default());
        assert_eq!(without_body.header("Content-Type"), None);
        assert_eq!(without_body.body, None);

        let with_body = build_request(
            BASE,
            &endpoint,
            &HashMap::new(),
            r#"{"title":"test"}"#,
            &Credentials::default(),
        );
        assert_eq!(with_body.header("Content-Type"), Some("application/json"));
        assert_eq!(with_body.body.as_deref(), Some(r#"{"title":"test"}"#));
    }

    #[test]
    fn test_get_never_carries_body() {
        let endpoint = endpoint(HttpMethod::Get, "/device", vec![]);
        let request = build_request(
            BASE,
            &endpoint,
            &HashMap::new(),
            r#"{"ignored":true}"#,
            &Credentials::default(),
        );
        assert_eq!(request.body, None);
        assert_eq!(request.header("Content-Type"), None);
    }

    #[test]
    fn test_header_param_applied() {
        let endpoint = endpoint(
            HttpMethod::Get,
            "/device",
            vec![
                param("X-Request-Id", ParamLocation::Header),
                param("X-Empty", ParamLocation::Header),
            ],
        );
        let request = build_request(
            BASE,
            &endpoint,
            &values(&[("X-Request-Id", "42"), ("X-Empty", "")]),
            "",
            &Credentials::default(),
        );
        assert_eq!(request.header("X-Request-Id"), Some("42"));
        assert_eq!(request.header("X-Empty"), None);
    }

    #[test]
    fn test_device_detail_scenario() {
        // GET /device/{deviceId}, example ABC123, creds ("k", "s")
        let endpoint = endpoint(
            HttpMethod::Get,
            "/device/{deviceId}",
            vec![param("deviceId", ParamLocation::Path)],
        );
        let request = build_request(
            BASE,
            &endpoint,
            &values(&[("deviceId", "ABC123")]),
            "",
            &Credentials::new("k", "s"),
        );
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, format!("{}/device/ABC123", BASE));
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert_eq!(request.header("Authorization"), Some("Basic azpz"));
        assert_eq!(request.body, None);
    }
}
