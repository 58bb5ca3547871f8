//! Logical request model
//!
//! A request is immutable once built: the gateway derives an authorized
//! copy by adding a header, never by mutating in place. Header keys
//! compare case-insensitively but preserve their declared spelling and
//! insertion order, which keeps the encoded wire form deterministic.

use std::fmt;

/// Request verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header map with case-insensitive keys.
///
/// Inserting a name that already exists (under any casing) replaces the
/// value in place, keeping the original position and spelling.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One logical request: verb, url, headers, optional JSON body.
#[derive(Debug, Clone)]
pub struct LogicalRequest {
    pub method: Method,
    pub url: String,
    headers: Headers,
    pub body: Option<serde_json::Value>,
}

impl LogicalRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Derive a new request with one more header set.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Derive a new request carrying a JSON body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body as the JSON text that goes on the wire; empty when absent.
    pub fn serialized_body(&self) -> String {
        match &self.body {
            // Serializing a Value cannot fail; the fallback is unreachable
            Some(body) => serde_json::to_string(body).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Encode into the wire form.
    pub fn encode(&self) -> Vec<u8> {
        tokenwire_wire::encode_request(
            self.method.as_str(),
            &self.url,
            self.headers.iter(),
            &self.serialized_body(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/json");
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert!(!headers.contains("Authorization"));
    }

    #[test]
    fn insert_replaces_in_place_preserving_order() {
        let mut headers = Headers::new();
        headers.insert("Accept", "*/*");
        headers.insert("Content-Type", "application/json");
        headers.insert("content-type", "text/plain");

        assert_eq!(headers.len(), 2);
        let entries: Vec<_> = headers.iter().collect();
        assert_eq!(entries[0], ("Accept", "*/*"));
        // Original spelling and position survive the replacement
        assert_eq!(entries[1], ("Content-Type", "text/plain"));
    }

    #[test]
    fn with_header_derives_without_touching_original() {
        let original = LogicalRequest::new(Method::Get, "/users");
        let authorized = original.clone().with_header("Authorization", "Bearer at_x");

        assert!(!original.headers().contains("Authorization"));
        assert_eq!(authorized.headers().get("Authorization"), Some("Bearer at_x"));
    }

    #[test]
    fn serialized_body_is_json_text() {
        let request =
            LogicalRequest::new(Method::Post, "/users").with_body(json!({"name": "ada"}));
        assert_eq!(request.serialized_body(), r#"{"name":"ada"}"#);

        let empty = LogicalRequest::new(Method::Get, "/users");
        assert_eq!(empty.serialized_body(), "");
    }

    #[test]
    fn encode_includes_verb_headers_and_body() {
        let request = LogicalRequest::new(Method::Post, "/users")
            .with_header("Accept", "application/json")
            .with_body(json!({"id": 1}));
        let text = String::from_utf8(request.encode()).unwrap();

        assert!(text.starts_with("POST /users HTTP/1.1\r\n"));
        assert!(text.contains("Accept: application/json\r\n"));
        assert!(text.contains("Content-Length: 8\r\n"));
        assert!(text.ends_with("{\"id\":1}"));
    }

    #[test]
    fn method_as_str_is_uppercase() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
