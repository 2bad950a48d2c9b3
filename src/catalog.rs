use std::fs;

use serde::Deserialize;
use serde_json::Value;

use crate::storage::find_project_root;

pub const DEFAULT_BASE_URL: &str = "https://cloud.mybox.pro/admin-panel/v1";

/// Path of the device-listing endpoint used for dropdown autofill.
pub const DEVICE_LIST_PATH: &str = "/external/device";

/// Parameter name that gets the fetched-device dropdown treatment.
pub const DEVICE_ID_PARAM: &str = "deviceId";

// --- Data model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Methods other than GET carry a request body when one is entered.
    pub fn sends_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
}

/// One explorable endpoint. This is the whole contract a catalog file
/// has to supply; everything else is derived from user input.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    pub id: String,
    pub title: String,
    pub description: String,
    pub method: HttpMethod,
    pub path: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub body_example: Option<Value>,
    pub response_example: Option<Value>,
    pub requires_auth: bool,
    pub base_url: Option<String>,
    pub device_autofill: bool,
}

impl EndpointSpec {
    pub fn param(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn params_at(&self, location: ParamLocation) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().filter(move |p| p.location == location)
    }
}

// --- Catalog file format ---
//
// TOML with [[endpoint]] tables; body/response examples are JSON text so
// authors can paste payloads verbatim.

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "endpoint")]
    endpoints: Vec<EndpointEntry>,
}

#[derive(Debug, Deserialize)]
struct EndpointEntry {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    method: HttpMethod,
    path: String,
    #[serde(default, rename = "parameter")]
    parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    body_example: Option<String>,
    #[serde(default)]
    response_example: Option<String>,
    #[serde(default = "default_true")]
    requires_auth: bool,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    device_autofill: bool,
}

fn default_true() -> bool {
    true
}

fn parse_example(field: &str, id: &str, text: Option<String>) -> Result<Option<Value>, String> {
    match text {
        None => Ok(None),
        Some(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
            format!("endpoint '{}': {} is not valid JSON: {}", id, field, e)
        }),
    }
}

impl EndpointEntry {
    fn into_spec(self) -> Result<EndpointSpec, String> {
        let body_example = parse_example("body_example", &self.id, self.body_example)?;
        let response_example = parse_example("response_example", &self.id, self.response_example)?;
        Ok(EndpointSpec {
            id: self.id,
            title: self.title,
            description: self.description,
            method: self.method,
            path: self.path,
            parameters: self.parameters,
            body_example,
            response_example,
            requires_auth: self.requires_auth,
            base_url: self.base_url,
            device_autofill: self.device_autofill,
        })
    }
}

// --- Validation ---

fn validate(endpoints: &[EndpointSpec]) -> Result<(), String> {
    let mut errors = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for endpoint in endpoints {
        if !seen.insert(endpoint.id.as_str()) {
            errors.push(format!("duplicate endpoint id '{}'", endpoint.id));
        }
        for param in &endpoint.parameters {
            if param.location == ParamLocation::Path {
                let placeholder = format!("{{{}}}", param.name);
                if !endpoint.path.contains(&placeholder) {
                    errors.push(format!(
                        "endpoint '{}': path parameter '{}' has no {} placeholder in \"{}\"",
                        endpoint.id, param.name, placeholder, endpoint.path
                    ));
                }
            }
            if let Some(values) = &param.allowed_values {
                if values.is_empty() {
                    errors.push(format!(
                        "endpoint '{}': parameter '{}' has an empty allowed_values list",
                        endpoint.id, param.name
                    ));
                }
            }
        }
        let mut names = std::collections::HashSet::new();
        for param in &endpoint.parameters {
            if !names.insert(param.name.as_str()) {
                errors.push(format!(
                    "endpoint '{}': duplicate parameter name '{}'",
                    endpoint.id, param.name
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

// --- Loading ---

#[derive(Debug, Clone)]
pub struct Catalog {
    pub endpoints: Vec<EndpointSpec>,
}

impl Catalog {
    pub fn from_toml(text: &str) -> Result<Vec<EndpointSpec>, String> {
        let file: CatalogFile =
            toml::from_str(text).map_err(|e| format!("failed to parse catalog: {}", e))?;
        file.endpoints
            .into_iter()
            .map(EndpointEntry::into_spec)
            .collect()
    }

    /// Built-in endpoints plus any project-local `.periscope/endpoints.toml`.
    pub fn load() -> Result<Self, String> {
        let mut endpoints = builtin_endpoints();

        if let Some(root) = find_project_root() {
            let path = root.join(".periscope").join("endpoints.toml");
            if path.exists() {
                let text = fs::read_to_string(&path)
                    .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
                let extra = Self::from_toml(&text)
                    .map_err(|e| format!("{}: {}", path.display(), e))?;
                endpoints.extend(extra);
            }
        }

        validate(&endpoints)?;
        Ok(Self { endpoints })
    }
}

// --- Built-in catalog ---

fn descriptor(
    name: &str,
    location: ParamLocation,
    required: bool,
    description: &str,
    example: Option<&str>,
    allowed_values: Option<&[&str]>,
) -> ParameterDescriptor {
    ParameterDescriptor {
        name: name.to_string(),
        location,
        required,
        description: description.to_string(),
        example: example.map(str::to_string),
        allowed_values: allowed_values.map(|vs| vs.iter().map(|v| v.to_string()).collect()),
    }
}

fn builtin_endpoints() -> Vec<EndpointSpec> {
    use serde_json::json;

    vec![
        EndpointSpec {
            id: "device-list".to_string(),
            title: "List devices".to_string(),
            description: "All devices registered to the account.".to_string(),
            method: HttpMethod::Get,
            path: "/external/device".to_string(),
            parameters: vec![
                descriptor(
                    "page",
                    ParamLocation::Query,
                    false,
                    "Page number, starting at 1.",
                    Some("1"),
                    None,
                ),
                descriptor(
                    "limit",
                    ParamLocation::Query,
                    false,
                    "Page size (max 100).",
                    None,
                    None,
                ),
            ],
            body_example: None,
            response_example: Some(json!({
                "data": [
                    { "identifier": "MBX-001204", "title": "Rooftop sensor", "system_title": "mbx-001204" }
                ],
                "total": 1
            })),
            requires_auth: true,
            base_url: None,
            device_autofill: false,
        },
        EndpointSpec {
            id: "device-detail".to_string(),
            title: "Device detail".to_string(),
            description: "Metadata and current state of a single device.".to_string(),
            method: HttpMethod::Get,
            path: "/external/device/{deviceId}".to_string(),
            parameters: vec![descriptor(
                DEVICE_ID_PARAM,
                ParamLocation::Path,
                true,
                "Device identifier.",
                Some("MBX-001204"),
                None,
            )],
            body_example: None,
            response_example: Some(json!({
                "identifier": "MBX-001204",
                "title": "Rooftop sensor",
                "online": true,
                "firmware": "2.4.1"
            })),
            requires_auth: true,
            base_url: None,
            device_autofill: true,
        },
        EndpointSpec {
            id: "device-update".to_string(),
            title: "Update device".to_string(),
            description: "Rename a device or move it between groups.".to_string(),
            method: HttpMethod::Put,
            path: "/external/device/{deviceId}".to_string(),
            parameters: vec![descriptor(
                DEVICE_ID_PARAM,
                ParamLocation::Path,
                true,
                "Device identifier.",
                Some("MBX-001204"),
                None,
            )],
            body_example: Some(json!({ "title": "Rooftop sensor (west)" })),
            response_example: Some(json!({
                "identifier": "MBX-001204",
                "title": "Rooftop sensor (west)"
            })),
            requires_auth: true,
            base_url: None,
            device_autofill: true,
        },
        EndpointSpec {
            id: "device-measurements".to_string(),
            title: "Device measurements".to_string(),
            description: "Time-series measurements recorded by a device.".to_string(),
            method: HttpMethod::Get,
            path: "/external/device/{deviceId}/measurement".to_string(),
            parameters: vec![
                descriptor(
                    DEVICE_ID_PARAM,
                    ParamLocation::Path,
                    true,
                    "Device identifier.",
                    Some("MBX-001204"),
                    None,
                ),
                descriptor(
                    "from",
                    ParamLocation::Query,
                    false,
                    "Start of the interval (ISO 8601).",
                    Some("2026-01-01T00:00:00Z"),
                    None,
                ),
                descriptor(
                    "to",
                    ParamLocation::Query,
                    false,
                    "End of the interval (ISO 8601).",
                    None,
                    None,
                ),
                descriptor(
                    "granularity",
                    ParamLocation::Query,
                    false,
                    "Aggregation window.",
                    None,
                    Some(&["hour", "day", "month"]),
                ),
            ],
            body_example: None,
            response_example: Some(json!({
                "data": [
                    { "timestamp": "2026-01-01T00:00:00Z", "temperature": 21.4, "humidity": 48 }
                ]
            })),
            requires_auth: true,
            base_url: None,
            device_autofill: true,
        },
        EndpointSpec {
            id: "device-command".to_string(),
            title: "Send command".to_string(),
            description: "Queue a command for a device to pick up on its next sync.".to_string(),
            method: HttpMethod::Post,
            path: "/external/device/{deviceId}/command".to_string(),
            parameters: vec![descriptor(
                DEVICE_ID_PARAM,
                ParamLocation::Path,
                true,
                "Device identifier.",
                Some("MBX-001204"),
                None,
            )],
            body_example: Some(json!({ "command": "restart" })),
            response_example: Some(json!({ "accepted": true })),
            requires_auth: true,
            base_url: None,
            device_autofill: true,
        },
        EndpointSpec {
            id: "device-delete".to_string(),
            title: "Delete device".to_string(),
            description: "Unregister a device from the account.".to_string(),
            method: HttpMethod::Delete,
            path: "/external/device/{deviceId}".to_string(),
            parameters: vec![descriptor(
                DEVICE_ID_PARAM,
                ParamLocation::Path,
                true,
                "Device identifier.",
                Some("MBX-001204"),
                None,
            )],
            body_example: None,
            response_example: None,
            requires_auth: true,
            base_url: None,
            device_autofill: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let endpoints = builtin_endpoints();
        assert!(!endpoints.is_empty());
        validate(&endpoints).unwrap();
    }

    #[test]
    fn test_builtin_path_params_have_placeholders() {
        for endpoint in builtin_endpoints() {
            for param in endpoint.params_at(ParamLocation::Path) {
                assert!(
                    endpoint.path.contains(&format!("{{{}}}", param.name)),
                    "{} is missing a placeholder for {}",
                    endpoint.path,
                    param.name
                );
            }
        }
    }

    #[test]
    fn test_parse_catalog_toml() {
        let text = r#"
[[endpoint]]
id = "group-list"
title = "List groups"
method = "GET"
path = "/external/group"

[[endpoint.parameter]]
name = "page"
location = "query"
description = "Page number."
example = "1"
"#;
        let endpoints = Catalog::from_toml(text).unwrap();
        assert_eq!(endpoints.len(), 1);
        let endpoint = &endpoints[0];
        assert_eq!(endpoint.id, "group-list");
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert!(endpoint.requires_auth);
        assert!(!endpoint.device_autofill);
        assert_eq!(endpoint.parameters[0].name, "page");
        assert_eq!(endpoint.parameters[0].location, ParamLocation::Query);
        assert!(!endpoint.parameters[0].required);
    }

    #[test]
    fn test_parse_catalog_with_json_examples() {
        let text = r#"
[[endpoint]]
id = "group-create"
title = "Create group"
method = "POST"
path = "/external/group"
body_example = '{"name":"Warehouse"}'
response_example = '{"id":7,"name":"Warehouse"}'
"#;
        let endpoints = Catalog::from_toml(text).unwrap();
        assert_eq!(
            endpoints[0].body_example,
            Some(serde_json::json!({"name": "Warehouse"}))
        );
        assert_eq!(
            endpoints[0].response_example.as_ref().unwrap()["id"],
            serde_json::json!(7)
        );
    }

    #[test]
    fn test_parse_catalog_rejects_bad_json_example() {
        let text = r#"
[[endpoint]]
id = "bad"
title = "Bad"
method = "POST"
path = "/x"
body_example = "{not json"
"#;
        let err = Catalog::from_toml(text).unwrap_err();
        assert!(err.contains("body_example"));
        assert!(err.contains("bad"));
    }

    #[test]
    fn test_parse_catalog_with_allowed_values() {
        let text = r#"
[[endpoint]]
id = "export"
title = "Export data"
method = "GET"
path = "/external/export"

[[endpoint.parameter]]
name = "format"
location = "query"
allowed_values = ["csv", "json"]
"#;
        let endpoints = Catalog::from_toml(text).unwrap();
        assert_eq!(
            endpoints[0].parameters[0].allowed_values,
            Some(vec!["csv".to_string(), "json".to_string()])
        );
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let mut endpoints = builtin_endpoints();
        let clone = endpoints[0].clone();
        endpoints.push(clone);
        let err = validate(&endpoints).unwrap_err();
        assert!(err.contains("duplicate endpoint id"));
    }

    #[test]
    fn test_validate_missing_placeholder() {
        let mut endpoints = builtin_endpoints();
        endpoints[1].path = "/external/device".to_string();
        let err = validate(&endpoints).unwrap_err();
        assert!(err.contains("placeholder"));
    }

    #[test]
    fn test_method_sends_body() {
        assert!(!HttpMethod::Get.sends_body());
        assert!(HttpMethod::Post.sends_body());
        assert!(HttpMethod::Delete.sends_body());
    }
}
