// Result shape interpretation

use serde_json::Value;

/// How a generated result should be laid out.
///
/// Streaming snapshots are always plain text; the document shape only occurs
/// for history entries the backend stored as parsed JSON objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    Text(String),
    Document(Vec<(String, SectionBody)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    Line(String),
    NumberedList(Vec<String>),
}

/// Decide the shape of a result value. Pure; safe to call on every redraw,
/// including on a still-growing snapshot.
pub fn interpret(value: &Value) -> RenderPlan {
    match value {
        Value::String(text) => RenderPlan::Text(text.clone()),
        Value::Object(sections) => RenderPlan::Document(
            sections
                .iter()
                .map(|(name, body)| (name.clone(), interpret_section(body)))
                .collect(),
        ),
        other => RenderPlan::Text(stringify(other)),
    }
}

fn interpret_section(value: &Value) -> SectionBody {
    match value {
        Value::Array(items) => SectionBody::NumberedList(items.iter().map(stringify).collect()),
        other => SectionBody::Line(stringify(other)),
    }
}

/// Stringify the way the UI shows scalars: strings verbatim, everything else
/// as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
