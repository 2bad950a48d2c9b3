use crate::request::ResolvedRequest;
use crate::storage::Credentials;

const KEY_PLACEHOLDER: &str = "YOUR_API_KEY";
const SECRET_PLACEHOLDER: &str = "YOUR_API_SECRET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnippetLang {
    #[default]
    Curl,
    Python,
    JavaScript,
}

impl SnippetLang {
    pub const ALL: [SnippetLang; 3] = [SnippetLang::Curl, SnippetLang::Python, SnippetLang::JavaScript];

    pub fn label(&self) -> &'static str {
        match self {
            SnippetLang::Curl => "cURL",
            SnippetLang::Python => "Python",
            SnippetLang::JavaScript => "JavaScript",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "curl" => Some(SnippetLang::Curl),
            "python" => Some(SnippetLang::Python),
            "javascript" => Some(SnippetLang::JavaScript),
            _ => None,
        }
    }
}

/// Generate source text that issues the resolved request in the chosen
/// ecosystem. `auth` is present when the endpoint requires authentication;
/// entered credentials are embedded verbatim, otherwise placeholder names
/// are used. All three outputs describe the same request: same method,
/// same URL, same body text.
pub fn generate(
    request: &ResolvedRequest,
    lang: SnippetLang,
    auth: Option<&Credentials>,
) -> String {
    let auth = auth.map(resolve_auth);
    match lang {
        SnippetLang::Curl => generate_curl(request, auth.as_ref()),
        SnippetLang::Python => generate_python(request, auth.as_ref()),
        SnippetLang::JavaScript => generate_javascript(request, auth.as_ref()),
    }
}

fn resolve_auth(credentials: &Credentials) -> (String, String) {
    let key = if credentials.key.is_empty() {
        KEY_PLACEHOLDER.to_string()
    } else {
        credentials.key.clone()
    };
    let secret = if credentials.secret.is_empty() {
        SECRET_PLACEHOLDER.to_string()
    } else {
        credentials.secret.clone()
    };
    (key, secret)
}

/// Headers to spell out per snippet; Basic auth is rendered in each
/// language's native idiom instead of a raw Authorization header.
fn plain_headers(request: &ResolvedRequest) -> impl Iterator<Item = &(String, String)> {
    request
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
}

fn generate_curl(request: &ResolvedRequest, auth: Option<&(String, String)>) -> String {
    let mut parts = vec![format!(
        "curl -X {} \"{}\"",
        request.method.as_str(),
        request.url
    )];

    if let Some((key, secret)) = auth {
        parts.push(format!("-u \"{}:{}\"", key, secret));
    }
    for (name, value) in plain_headers(request) {
        parts.push(format!("-H \"{}: {}\"", name, value));
    }
    if let Some(body) = &request.body {
        parts.push(format!("-d '{}'", body.replace('\'', "'\\''")));
    }

    parts.join(" \\\n  ")
}

fn generate_python(request: &ResolvedRequest, auth: Option<&(String, String)>) -> String {
    let mut code = String::from("import requests\n\n");

    if let Some((key, secret)) = auth {
        code.push_str(&format!("API_KEY = \"{}\"\n", key));
        code.push_str(&format!("API_SECRET = \"{}\"\n\n", secret));
    }

    code.push_str(&format!(
        "response = requests.{}(\n    \"{}\",\n",
        request.method.as_str().to_lowercase(),
        request.url
    ));
    if auth.is_some() {
        code.push_str("    auth=(API_KEY, API_SECRET),\n");
    }

    let headers: Vec<String> = plain_headers(request)
        .map(|(name, value)| format!("\"{}\": \"{}\"", name, value))
        .collect();
    code.push_str(&format!("    headers={{{}}},\n", headers.join(", ")));

    if let Some(body) = &request.body {
        code.push_str(&format!("    data='''{}''',\n", body));
    }

    code.push_str(")\n\nprint(response.status_code)\nprint(response.json())");
    code
}

fn generate_javascript(request: &ResolvedRequest, auth: Option<&(String, String)>) -> String {
    let mut code = String::new();

    if let Some((key, secret)) = auth {
        code.push_str(&format!("const API_KEY = '{}';\n", key));
        code.push_str(&format!("const API_SECRET = '{}';\n\n", secret));
    }

    code.push_str("async function callApi() {\n");
    code.push_str(&format!("  const response = await fetch('{}', {{\n", request.url));
    code.push_str(&format!("    method: '{}',\n", request.method.as_str()));
    code.push_str("    headers: {\n");
    if auth.is_some() {
        code.push_str("      'Authorization': 'Basic ' + btoa(`${API_KEY}:${API_SECRET}`),\n");
    }
    for (name, value) in plain_headers(request) {
        code.push_str(&format!("      '{}': '{}',\n", name, value));
    }
    code.push_str("    },\n");
    if let Some(body) = &request.body {
        code.push_str(&format!("    body: JSON.stringify({}),\n", body));
    }
    code.push_str("  });\n\n");
    code.push_str("  if (!response.ok) {\n");
    code.push_str("    console.error('Error:', response.status, await response.text());\n");
    code.push_str("    return;\n");
    code.push_str("  }\n");
    code.push_str("  console.log(await response.json());\n");
    code.push_str("}\n\ncallApi();");
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HttpMethod;

    fn post_request() -> ResolvedRequest {
        ResolvedRequest {
            method: HttpMethod::Post,
            url: "https://cloud.mybox.pro/admin-panel/v1/external/device/MBX-1/command"
                .to_string(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Basic azpz".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: Some(r#"{"command":"restart"}"#.to_string()),
        }
    }

    fn get_request() -> ResolvedRequest {
        ResolvedRequest {
            method: HttpMethod::Get,
            url: "https://cloud.mybox.pro/admin-panel/v1/external/device".to_string(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    #[test]
    fn test_snippets_reference_same_request() {
        let request = post_request();
        let auth = Credentials::new("k", "s");

        for lang in SnippetLang::ALL {
            let snippet = generate(&request, lang, Some(&auth));
            assert!(snippet.contains(&request.url), "{:?} is missing the URL", lang);
            assert!(
                snippet.contains(r#"{"command":"restart"}"#),
                "{:?} is missing the body",
                lang
            );
            assert!(snippet.contains("Accept"), "{:?} is missing Accept", lang);
            assert!(
                snippet.contains("Content-Type"),
                "{:?} is missing Content-Type",
                lang
            );
        }

        assert!(generate(&request, SnippetLang::Curl, Some(&auth)).contains("-X POST"));
        assert!(generate(&request, SnippetLang::Python, Some(&auth)).contains("requests.post("));
        assert!(generate(&request, SnippetLang::JavaScript, Some(&auth)).contains("method: 'POST'"));
    }

    #[test]
    fn test_live_credentials_embedded() {
        let request = post_request();
        let auth = Credentials::new("live-key", "live-secret");
        let curl = generate(&request, SnippetLang::Curl, Some(&auth));
        assert!(curl.contains("-u \"live-key:live-secret\""));

        let python = generate(&request, SnippetLang::Python, Some(&auth));
        assert!(python.contains("API_KEY = \"live-key\""));
        assert!(python.contains("auth=(API_KEY, API_SECRET)"));

        let js = generate(&request, SnippetLang::JavaScript, Some(&auth));
        assert!(js.contains("const API_KEY = 'live-key';"));
        assert!(js.contains("btoa(`${API_KEY}:${API_SECRET}`)"));
    }

    #[test]
    fn test_placeholders_when_credentials_unset() {
        let request = get_request();
        let auth = Credentials::default();
        for lang in SnippetLang::ALL {
            let snippet = generate(&request, lang, Some(&auth));
            assert!(snippet.contains("YOUR_API_KEY"), "{:?}", lang);
            assert!(snippet.contains("YOUR_API_SECRET"), "{:?}", lang);
        }
    }

    #[test]
    fn test_no_auth_lines_without_auth() {
        let request = get_request();
        for lang in SnippetLang::ALL {
            let snippet = generate(&request, lang, None);
            assert!(!snippet.contains("API_KEY"), "{:?}", lang);
            assert!(!snippet.contains("-u \""), "{:?}", lang);
            assert!(!snippet.contains("auth="), "{:?}", lang);
        }
    }

    #[test]
    fn test_get_snippets_have_no_body() {
        let request = get_request();
        let auth = Credentials::new("k", "s");
        assert!(!generate(&request, SnippetLang::Curl, Some(&auth)).contains("-d "));
        assert!(!generate(&request, SnippetLang::Python, Some(&auth)).contains("data="));
        assert!(!generate(&request, SnippetLang::JavaScript, Some(&auth)).contains("body:"));
    }

    #[test]
    fn test_curl_escapes_single_quotes_in_body() {
        let mut request = post_request();
        request.body = Some(r#"{"note":"it's fine"}"#.to_string());
        let curl = generate(&request, SnippetLang::Curl, None);
        assert!(curl.contains(r#"{"note":"it'\''s fine"}"#));
    }

    #[test]
    fn test_raw_authorization_header_not_duplicated() {
        let request = post_request();
        let auth = Credentials::new("k", "s");
        // Each language renders Basic auth natively; the prebuilt header
        // value must not leak in alongside it.
        let curl = generate(&request, SnippetLang::Curl, Some(&auth));
        assert!(!curl.contains("Basic azpz"));
    }

    #[test]
    fn test_lang_from_name() {
        assert_eq!(SnippetLang::from_name("curl"), Some(SnippetLang::Curl));
        assert_eq!(SnippetLang::from_name("python"), Some(SnippetLang::Python));
        assert_eq!(
            SnippetLang::from_name("javascript"),
            Some(SnippetLang::JavaScript)
        );
        assert_eq!(SnippetLang::from_name("ruby"), None);
    }
}
