use std::collections::HashMap;

use uuid::Uuid;

use crate::catalog::{EndpointSpec, DEVICE_ID_PARAM};
use crate::devices::DeviceRecord;
use crate::http::ResponseData;
use crate::request::{build_request, ResolvedRequest};
use crate::snippet::{self, SnippetLang};
use crate::storage::Credentials;

// --- Response lifecycle ---

#[derive(Debug, Clone, Default)]
pub enum ResponseState {
    #[default]
    Absent,
    Loading,
    Success(ResponseData),
    Error {
        message: String,
        /// Present when the server answered with a non-success status;
        /// the parsed body is still worth showing.
        response: Option<ResponseData>,
    },
}

// --- Events and effects ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Key,
    Secret,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Fired once after the explorer is created: copies parameter examples
    /// into live values and kicks off the device fetch when applicable.
    Mounted,
    ParamChanged { name: String, value: String },
    CredentialChanged { field: CredentialField, value: String },
    BodyChanged(String),
    LanguageTabSelected(SnippetLang),
    SubmitRequested,
    RequestCompleted {
        token: Uuid,
        result: Result<ResponseData, String>,
    },
    DevicesLoaded(Vec<DeviceRecord>),
}

/// I/O the shell has to perform on the reducer's behalf.
#[derive(Debug, Clone)]
pub enum Effect {
    PersistCredentials(Credentials),
    Execute { token: Uuid, request: ResolvedRequest },
    FetchDevices,
}

// --- Explorer ---

/// State of one explorable endpoint. All mutation goes through `apply`;
/// the resolved request and snippet are derived on demand.
pub struct Explorer {
    pub endpoint: EndpointSpec,
    pub base_url: String,
    pub credentials: Credentials,
    pub values: HashMap<String, String>,
    pub body: String,
    pub language: SnippetLang,
    pub response: ResponseState,
    pub devices: Vec<DeviceRecord>,
    inflight: Option<Uuid>,
    devices_requested: bool,
}

impl Explorer {
    pub fn new(
        endpoint: EndpointSpec,
        default_base_url: &str,
        credentials: Credentials,
        language: SnippetLang,
    ) -> Self {
        let base_url = endpoint
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url.to_string());
        let body = endpoint
            .body_example
            .as_ref()
            .map(|value| serde_json::to_string_pretty(value).unwrap_or_default())
            .unwrap_or_default();

        Self {
            endpoint,
            base_url,
            credentials,
            values: HashMap::new(),
            body,
            language,
            response: ResponseState::Absent,
            devices: Vec::new(),
            inflight: None,
            devices_requested: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.response, ResponseState::Loading)
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn resolved_request(&self) -> ResolvedRequest {
        build_request(
            &self.base_url,
            &self.endpoint,
            &self.values,
            &self.body,
            &self.credentials,
        )
    }

    pub fn snippet(&self) -> String {
        let auth = self
            .endpoint
            .requires_auth
            .then_some(&self.credentials);
        snippet::generate(&self.resolved_request(), self.language, auth)
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Mounted => {
                for param in &self.endpoint.parameters {
                    if let Some(example) = &param.example {
                        if !example.is_empty() {
                            self.values.insert(param.name.clone(), example.clone());
                        }
                    }
                }
                self.maybe_fetch_devices()
            }
            Event::ParamChanged { name, value } => {
                self.values.insert(name, value);
                Vec::new()
            }
            Event::CredentialChanged { field, value } => {
                match field {
                    CredentialField::Key => self.credentials.key = value,
                    CredentialField::Secret => self.credentials.secret = value,
                }
                self.maybe_fetch_devices()
            }
            Event::BodyChanged(text) => {
                self.body = text;
                Vec::new()
            }
            Event::LanguageTabSelected(lang) => {
                self.language = lang;
                Vec::new()
            }
            Event::SubmitRequested => self.submit(),
            Event::RequestCompleted { token, result } => {
                self.complete(token, result);
                Vec::new()
            }
            Event::DevicesLoaded(devices) => {
                self.devices = devices;
                self.autoselect_device();
                Vec::new()
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.is_loading() {
            return Vec::new();
        }

        if self.endpoint.requires_auth && !self.credentials.is_complete() {
            self.response = ResponseState::Error {
                message: "Please enter an API key and secret".to_string(),
                response: None,
            };
            return Vec::new();
        }

        let token = Uuid::new_v4();
        self.inflight = Some(token);
        self.response = ResponseState::Loading;

        vec![
            Effect::PersistCredentials(self.credentials.clone()),
            Effect::Execute {
                token,
                request: self.resolved_request(),
            },
        ]
    }

    fn complete(&mut self, token: Uuid, result: Result<ResponseData, String>) {
        // A completion from a superseded submission never lands.
        if self.inflight != Some(token) {
            return;
        }
        self.inflight = None;

        self.response = match result {
            Ok(data) if data.is_success() => ResponseState::Success(data),
            Ok(data) => ResponseState::Error {
                message: format!("Error {}: {}", data.status, data.status_text),
                response: Some(data),
            },
            Err(message) => ResponseState::Error {
                message,
                response: None,
            },
        };
    }

    fn maybe_fetch_devices(&mut self) -> Vec<Effect> {
        if self.endpoint.device_autofill
            && self.credentials.is_complete()
            && !self.devices_requested
        {
            self.devices_requested = true;
            vec![Effect::FetchDevices]
        } else {
            Vec::new()
        }
    }

    fn autoselect_device(&mut self) {
        if self.endpoint.param(DEVICE_ID_PARAM).is_none() {
            return;
        }
        if !self.value(DEVICE_ID_PARAM).is_empty() {
            return;
        }
        if let Some(first) = self.devices.first() {
            self.values
                .insert(DEVICE_ID_PARAM.to_string(), first.identifier.clone());
        }
    }
}
