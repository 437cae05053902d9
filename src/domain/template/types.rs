//! Template types and error definitions

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template API answered 404 for this ID
    #[error("Template with ID {0} not found")]
    NotFound(TemplateId),

    /// Non-success status or transport fault talking to the template API
    #[error("Failed to fetch template: {message}")]
    ApiFailure {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid template ID: {0}")]
    InvalidId(String),

    #[error("Invalid template variable '{0}': value must be a string, number, boolean or null")]
    InvalidVariable(String),

    /// The HTTP client for the template API could not be built
    #[error("Failed to build template API client: {0}")]
    Client(#[source] reqwest::Error),
}

impl TemplateError {
    /// API failure for a non-success HTTP status.
    pub fn api_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::ApiFailure {
            status: Some(status),
            message: format!("API request failed with status {}: {}", status, body),
            source: None,
        }
    }

    /// API failure for a transport-level fault.
    pub fn api_transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ApiFailure {
            status: None,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// HTTP status carried by an API failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiFailure { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Identifier of a remote template: a non-empty string or an integer.
///
/// Stringified verbatim for cache keys and URL path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged, try_from = "Value")]
pub enum TemplateId {
    Numeric(u64),
    Text(String),
}

impl TryFrom<Value> for TemplateId {
    type Error = TemplateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Self::try_from(s),
            Value::Number(n) => n.as_u64().map(Self::Numeric).ok_or_else(|| {
                TemplateError::InvalidId(format!("{} is not a non-negative integer", n))
            }),
            other => Err(TemplateError::InvalidId(format!(
                "expected a string or integer, got {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for TemplateId {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(TemplateError::InvalidId(
                "ID must be a non-empty string".to_string(),
            ));
        }
        Ok(Self::Text(value))
    }
}

impl TryFrom<&str> for TemplateId {
    type Error = TemplateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl From<u64> for TemplateId {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A template record as returned by the template API.
///
/// The raw JSON object is kept as-is (unknown fields included) so the
/// exact payload can be cached and returned; typed accessors read the
/// fields the renderer needs. Non-string values count as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template(Map<String, Value>);

impl Template {
    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.str_field("subject")
    }

    pub fn from_email(&self) -> Option<&str> {
        self.str_field("from_email")
    }

    pub fn from_name(&self) -> Option<&str> {
        self.str_field("from_name")
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.str_field("reply_to")
    }

    /// `data.html`, empty when missing
    pub fn html(&self) -> &str {
        self.0
            .get("data")
            .and_then(|data| data.get("html"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn text(&self) -> Option<&str> {
        self.str_field("text")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Scalar value allowed in a render context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

impl ScalarValue {
    /// Text substituted for the placeholder
    pub fn as_replacement(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Null => String::new(),
        }
    }
}

impl TryFrom<Value> for ScalarValue {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::String(s)),
            Value::Number(n) => Ok(Self::Number(n)),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Null => Ok(Self::Null),
            other => Err(other),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Variables substituted into a template, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    entries: Vec<(String, ScalarValue)>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable. Re-inserting a key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ScalarValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Build from a JSON object, refusing arrays and nested objects.
    pub fn from_json(value: Value) -> TemplateResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Ok(Self::default()),
            _ => Err(TemplateError::InvalidVariable(
                "<root> (variables must be an object)".to_string(),
            )),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> TemplateResult<Self> {
        let mut context = Self::default();
        for (key, value) in map {
            let scalar =
                ScalarValue::try_from(value).map_err(|_| TemplateError::InvalidVariable(key.clone()))?;
            context.entries.push((key, scalar));
        }
        Ok(context)
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RenderContext {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RenderContext {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}

/// Sender address of a rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A fully rendered message ready to hand to the mail system
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Present only when the template carries `from_email`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    pub html: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_id_display() {
        assert_eq!(TemplateId::from(42).to_string(), "42");
        assert_eq!(TemplateId::try_from("welcome").unwrap().to_string(), "welcome");
    }

    #[test]
    fn test_template_id_rejects_empty() {
        assert!(matches!(
            TemplateId::try_from(""),
            Err(TemplateError::InvalidId(_))
        ));
        assert!(TemplateId::try_from("   ").is_err());
    }

    #[test]
    fn test_template_id_deserialize() {
        let numeric: TemplateId = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(numeric, TemplateId::Numeric(7));

        let text: TemplateId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(text, TemplateId::Text("abc".to_string()));

        assert!(serde_json::from_value::<TemplateId>(json!("")).is_err());
        assert!(serde_json::from_value::<TemplateId>(json!(-1)).is_err());
        assert!(serde_json::from_value::<TemplateId>(json!(1.5)).is_err());
        assert!(serde_json::from_value::<TemplateId>(json!(true)).is_err());

        let err = serde_json::from_value::<TemplateId>(json!(null)).unwrap_err();
        assert!(err.to_string().contains("Invalid template ID"));
    }

    #[test]
    fn test_client_error_is_not_a_fetch_failure() {
        let build_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = TemplateError::Client(build_err);

        assert!(err
            .to_string()
            .starts_with("Failed to build template API client"));
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_template_accessors() {
        let template = Template::from_value(json!({
            "subject": "Hi {{name}}",
            "from_email": "noreply@example.com",
            "from_name": "Example",
            "reply_to": "support@example.com",
            "data": {"html": "<p>Hi</p>"},
            "text": "Hi",
            "extra": 1
        }))
        .unwrap();

        assert_eq!(template.subject(), Some("Hi {{name}}"));
        assert_eq!(template.from_email(), Some("noreply@example.com"));
        assert_eq!(template.from_name(), Some("Example"));
        assert_eq!(template.reply_to(), Some("support@example.com"));
        assert_eq!(template.html(), "<p>Hi</p>");
        assert_eq!(template.text(), Some("Hi"));
        assert_eq!(template.get("extra"), Some(&json!(1)));
    }

    #[test]
    fn test_template_missing_fields() {
        let template = Template::from_value(json!({"subject": null, "data": {}})).unwrap();
        assert_eq!(template.subject(), None);
        assert_eq!(template.html(), "");
        assert_eq!(template.text(), None);
    }

    #[test]
    fn test_template_from_non_object() {
        assert!(Template::from_value(json!([1, 2])).is_none());
        assert!(Template::from_value(json!("html")).is_none());
    }

    #[test]
    fn test_render_context_rejects_non_scalar() {
        let err = RenderContext::from_json(json!({"name": "A", "items": [1, 2]})).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidVariable(ref key) if key == "items"));

        assert!(RenderContext::from_json(json!({"nested": {"a": 1}})).is_err());
        assert!(RenderContext::from_json(json!("flat")).is_err());
    }

    #[test]
    fn test_render_context_preserves_order() {
        let context =
            RenderContext::from_json(json!({"zeta": "z", "alpha": 1, "mid": true})).unwrap();
        let keys: Vec<&str> = context.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_render_context_insert_overwrites_in_place() {
        let mut context = RenderContext::new().with("a", "1").with("b", "2");
        context.insert("a", "3");
        let entries: Vec<(&str, String)> = context
            .iter()
            .map(|(k, v)| (k, v.as_replacement()))
            .collect();
        assert_eq!(entries, vec![("a", "3".to_string()), ("b", "2".to_string())]);
    }

    #[test]
    fn test_scalar_replacement() {
        assert_eq!(ScalarValue::from("x").as_replacement(), "x");
        assert_eq!(ScalarValue::from(42i64).as_replacement(), "42");
        assert_eq!(ScalarValue::from(true).as_replacement(), "true");
        assert_eq!(ScalarValue::Null.as_replacement(), "");
    }

    #[test]
    fn test_api_status_error_message() {
        let err = TemplateError::api_status(500, "boom");
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "Failed to fetch template: API request failed with status 500: boom"
        );
    }

    #[test]
    fn test_not_found_message_includes_id() {
        let err = TemplateError::NotFound(TemplateId::from(99));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Template with ID 99 not found");
    }
}
