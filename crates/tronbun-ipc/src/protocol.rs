//! Wire envelopes exchanged with a helper process.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `type` tag of a command completion.
pub const RESPONSE_TYPE: &str = "response";

/// A command written to the helper's stdin as one JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundCommand {
    pub method: String,
    pub id: String,
    pub params: Value,
}

impl OutboundCommand {
    pub fn new(method: impl Into<String>, id: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            id: id.into(),
            params,
        }
    }

    /// Serialize to a single line including the trailing newline.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Any JSON object read from the helper's stdout.
///
/// Only `type`, `id`, `result` and `error` are interpreted by the transport;
/// every other field is kept in `fields` for the event routers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl InboundMessage {
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    pub fn is_response(&self) -> bool {
        self.kind() == RESPONSE_TYPE
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Error text carried by a completion. Empty strings and `null` do not
    /// count as errors.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Outcome of a completion: the error text, or the result (`null` when absent).
    pub fn into_outcome(self) -> Result<Value, String> {
        match self.error_message() {
            Some(message) => Err(message),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Render a string or number field as a string. Helpers echo numeric ids
/// from web content verbatim.
pub fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_encodes_as_single_line() {
        let cmd = OutboundCommand::new("set_title", "1", json!({"title": "X"}));
        assert_eq!(
            cmd.encode().unwrap(),
            "{\"method\":\"set_title\",\"id\":\"1\",\"params\":{\"title\":\"X\"}}\n"
        );
    }

    #[test]
    fn embedded_newlines_are_escaped() {
        let cmd = OutboundCommand::new("eval", "2", json!({"js": "a\nb"}));
        let line = cmd.encode().unwrap();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn parses_success_response() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"response","id":"1","result":null}"#).unwrap();
        assert!(msg.is_response());
        assert_eq!(msg.id.as_deref(), Some("1"));
        assert_eq!(msg.into_outcome(), Ok(Value::Null));
    }

    #[test]
    fn parses_error_response() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"response","id":"7","error":"bad url"}"#).unwrap();
        assert_eq!(msg.into_outcome(), Err("bad url".to_string()));
    }

    #[test]
    fn empty_error_is_success() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"response","id":"7","error":"","result":"ok"}"#)
                .unwrap();
        assert_eq!(msg.into_outcome(), Ok(json!("ok")));
    }

    #[test]
    fn numeric_id_is_stringified() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"response","id":42,"result":1}"#).unwrap();
        assert_eq!(msg.id.as_deref(), Some("42"));
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"menu_click","data":{"menuId":"quit"}}"#).unwrap();
        assert_eq!(msg.kind(), "menu_click");
        assert_eq!(msg.id, None);
        assert_eq!(msg.field("data"), Some(&json!({"menuId": "quit"})));
    }

    #[test]
    fn non_object_lines_are_rejected() {
        assert!(serde_json::from_str::<InboundMessage>("42").is_err());
        assert!(serde_json::from_str::<InboundMessage>("Starting WebView...").is_err());
    }
}
