//! Demo window type and page.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tronbun_common::HandlerError;
use tronbun_webview::{Declaration, IpcWindow};

#[derive(Default)]
pub struct DemoWindow {
    greetings: AtomicU64,
}

impl DemoWindow {
    fn greet(&self, data: Value) -> Value {
        let name = data["name"].as_str().unwrap_or("stranger");
        let count = self.greetings.fetch_add(1, Ordering::Relaxed) + 1;
        json!({ "message": format!("Hello, {name}!"), "count": count })
    }

    fn calc(&self, data: Value) -> Result<Value, HandlerError> {
        let operand = |key: &str| {
            data[key]
                .as_f64()
                .ok_or_else(|| HandlerError::new(format!("'{key}' must be a number")))
        };
        let (a, b) = (operand("a")?, operand("b")?);
        let result = match data["op"].as_str().unwrap_or("+") {
            "+" => a + b,
            "-" => a - b,
            "*" => a * b,
            "/" if b == 0.0 => return Err(HandlerError::new("division by zero")),
            "/" => a / b,
            op => return Err(HandlerError::new(format!("unknown operator '{op}'"))),
        };
        Ok(json!({ "result": result }))
    }
}

impl IpcWindow for DemoWindow {
    fn declare(decl: &mut Declaration<Self>) {
        decl.name("DemoWindow")
            .handler("greet", |this: Arc<Self>, data| async move { Ok(this.greet(data)) })
            .handler("calc", |this: Arc<Self>, data| async move { this.calc(data) });
    }
}

pub const DEMO_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Tronbun Demo</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem; }
    input { width: 5rem; }
    pre { background: #f3f3f3; padding: 0.5rem; }
  </style>
</head>
<body>
  <h1>Tronbun</h1>
  <p>
    <input id="name" value="World">
    <button onclick="doGreet()">Greet</button>
  </p>
  <p>
    <input id="a" value="6"> <select id="op"><option>+</option><option>-</option>
    <option>*</option><option>/</option></select> <input id="b" value="7">
    <button onclick="doCalc()">Calculate</button>
  </p>
  <pre id="out"></pre>
  <script>
    function show(value) {
      document.getElementById('out').textContent = JSON.stringify(value, null, 2);
    }
    async function doGreet() {
      show(await window.DemoWindow.greet({ name: document.getElementById('name').value }));
    }
    async function doCalc() {
      show(await window.DemoWindow.calc({
        a: Number(document.getElementById('a').value),
        b: Number(document.getElementById('b').value),
        op: document.getElementById('op').value,
      }));
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greet_counts_calls() {
        let demo = DemoWindow::default();
        assert_eq!(demo.greet(json!({"name": "Ada"}))["message"], "Hello, Ada!");
        assert_eq!(demo.greet(json!({}))["count"], 2);
    }

    #[test]
    fn calc_operators() {
        let demo = DemoWindow::default();
        let run = |op: &str| demo.calc(json!({"a": 6, "b": 3, "op": op}));
        assert_eq!(run("+").unwrap()["result"], 9.0);
        assert_eq!(run("-").unwrap()["result"], 3.0);
        assert_eq!(run("*").unwrap()["result"], 18.0);
        assert_eq!(run("/").unwrap()["result"], 2.0);
        assert!(run("%").is_err());
    }

    #[test]
    fn calc_rejects_bad_input() {
        let demo = DemoWindow::default();
        let err = demo.calc(json!({"a": 1, "b": 0, "op": "/"})).unwrap_err();
        assert_eq!(err.to_string(), "division by zero");
        assert!(demo.calc(json!({"a": "x", "b": 1})).is_err());
    }

    #[test]
    fn page_calls_declared_namespace() {
        assert!(DEMO_HTML.contains("window.DemoWindow.greet("));
        assert!(DEMO_HTML.contains("window.DemoWindow.calc("));
    }
}
