//! Direct-eval backend: JavaScript on the embedded QuickJS engine.

use quick_js::console::Level;
use quick_js::{Context, ExecutionError, JsValue};

use crate::capture::{with_capture, ConsoleSink};
use crate::error::RunnerError;
use crate::transcript::{LogLine, Tag};

/// Execute a JavaScript snippet and return its transcript.
///
/// The snippet is wrapped as a callable body, so `return` works at the top
/// level. Console writes are captured in call order; a non-`undefined`
/// completion value becomes one trailing `RETURN` line; a thrown value
/// becomes one `ERROR` line after whatever output was already produced.
/// Every run gets a fresh context — no guest state survives between runs.
pub fn run(source: &str) -> Vec<LogLine> {
    let captured = with_capture(|sink| eval_snippet(source, sink));
    let mut lines = captured.lines;
    if let Some(value) = captured.value {
        if !matches!(value, JsValue::Undefined) {
            lines.push(LogLine::new(Tag::Return, render_value(&value)));
        }
    }
    lines
}

fn eval_snippet(source: &str, sink: &ConsoleSink) -> Result<JsValue, RunnerError> {
    let console = sink.clone();
    let context = Context::builder()
        .console(move |level: Level, args: Vec<JsValue>| {
            let tag = match level {
                Level::Warn => Tag::Warn,
                Level::Error => Tag::Error,
                _ => Tag::Output,
            };
            let text = args
                .iter()
                .map(render_value)
                .collect::<Vec<_>>()
                .join(" ");
            console.write(tag, text);
        })
        .build()
        .map_err(|e| RunnerError::Guest(e.to_string()))?;

    context
        .eval(&wrap(source))
        .map_err(|e| RunnerError::Guest(describe_failure(e)))
}

/// Make the snippet a function body. The inner catch stringifies `Error`
/// objects so the host always sees a readable message instead of an opaque
/// exception object.
fn wrap(source: &str) -> String {
    format!(
        "(function() {{\n\
         try {{\n\
         return (function() {{\n\
         {source}\n\
         }})();\n\
         }} catch (err) {{\n\
         throw err instanceof Error ? String(err) : err;\n\
         }}\n\
         }})()"
    )
}

fn describe_failure(err: ExecutionError) -> String {
    match err {
        ExecutionError::Exception(JsValue::String(message)) => message,
        ExecutionError::Exception(value) => render_value(&value),
        other => other.to_string(),
    }
}

/// Serialize a guest value for display: primitives as their literal text,
/// arrays and objects as pretty-printed JSON.
fn render_value(value: &JsValue) -> String {
    match value {
        JsValue::Undefined => "undefined".to_string(),
        JsValue::Null => "null".to_string(),
        JsValue::Bool(b) => b.to_string(),
        JsValue::Int(i) => i.to_string(),
        JsValue::Float(f) => f.to_string(),
        JsValue::String(s) => s.clone(),
        JsValue::Array(_) | JsValue::Object(_) => {
            serde_json::to_string_pretty(&to_json(value))
                .unwrap_or_else(|_| format!("{value:?}"))
        }
        other => format!("{other:?}"),
    }
}

fn to_json(value: &JsValue) -> serde_json::Value {
    use serde_json::Value;
    match value {
        JsValue::Undefined | JsValue::Null => Value::Null,
        JsValue::Bool(b) => Value::Bool(*b),
        JsValue::Int(i) => Value::from(*i),
        JsValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        JsValue::String(s) => Value::String(s.clone()),
        JsValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        JsValue::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
        other => Value::String(format!("{other:?}")),
    }
}
