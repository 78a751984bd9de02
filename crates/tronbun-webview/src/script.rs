//! Client stub generation for page content.
//!
//! The window helper installs `window.tronbun.invoke(channel, data)` in every
//! page. A stub script adds `window.<namespace>.<handler>(data)` forwarders
//! on top of it, one per declared handler.

use regex::Regex;
use std::sync::LazyLock;
use tronbun_common::TronbunError;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Script evaluated to force a full page reload.
pub const RELOAD_SCRIPT: &str = "window.location.reload(true);";

pub fn is_js_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

fn check_identifier(kind: &str, name: &str) -> Result<(), TronbunError> {
    if is_js_identifier(name) {
        Ok(())
    } else {
        Err(TronbunError::InvalidIdentifier(format!("{kind} '{name}'")))
    }
}

/// Build the stub script exposing `handlers` under `window.<namespace>`.
pub fn client_stub<S: AsRef<str>>(namespace: &str, handlers: &[S]) -> Result<String, TronbunError> {
    check_identifier("window name", namespace)?;

    let mut body = String::new();
    for handler in handlers {
        let handler = handler.as_ref();
        check_identifier("handler name", handler)?;
        body.push_str(&format!(
            "\n  window.{namespace}.{handler} = function(data) {{\n    return window.tronbun.invoke('{handler}', data);\n  }};"
        ));
    }

    Ok(format!(
        "(function() {{\n  window.{namespace} = {{}};{body}\n}}())"
    ))
}
