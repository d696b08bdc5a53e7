//! LLM-backed generator: prompt the model for JSON, then extract and validate.

use std::collections::HashSet;
use std::sync::Arc;

use canvas::model::{DiagramData, DiagramEdge, DiagramKind, DiagramNode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{DiagramGenerator, GenerateError, validate_prompt};
use crate::llm::LlmChat;
use crate::llm::types::{ChatRequest, Message};

pub const SYSTEM_PROMPT: &str = r#"You are an expert at converting natural language into structured diagram data.

Analyze the prompt and create a diagram with:
- Appropriate type (flowchart, org_chart, decision_tree, timeline, or architecture)
- Clear nodes with short labels (2-5 words each)
- Logical connections between nodes

Return ONLY a valid JSON object with this structure:
{
  "type": "flowchart",
  "nodes": [{"id": "1", "label": "Start"}],
  "edges": [{"from": "1", "to": "2"}]
}"#;

pub struct LlmGenerator {
    llm: Arc<dyn LlmChat>,
    max_tokens: u32,
    temperature: f64,
}

impl LlmGenerator {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, max_tokens: u32, temperature: f64) -> Self {
        Self { llm, max_tokens, temperature }
    }
}

#[async_trait::async_trait]
impl DiagramGenerator for LlmGenerator {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn generate(&self, prompt: &str) -> Result<DiagramData, GenerateError> {
        let prompt = validate_prompt(prompt)?;
        let messages = [Message::user(format!("Create a diagram for: \"{prompt}\"\n\nReturn only the JSON object."))];

        let request = ChatRequest {
            system: SYSTEM_PROMPT,
            messages: &messages,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };
        let response = self.llm.chat(request).await?;
        info!(
            model = %response.model,
            stop_reason = %response.stop_reason,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "generate: llm response"
        );

        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        parse_diagram(&text)
    }
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Strip Markdown code fences and return the outermost `{...}` span.
///
/// Text without braces is returned fence-stripped and trimmed so the JSON
/// parser reports a meaningful error.
#[must_use]
pub fn extract_json(text: &str) -> String {
    let cleaned = text.replace("```json", "").replace("```", "");
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => cleaned[start..=end].to_string(),
        _ => cleaned.trim().to_string(),
    }
}

/// Extract, parse and validate a model reply.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidJson`] when no JSON object can be parsed,
/// or a validation error from [`validate_diagram`].
pub fn parse_diagram(text: &str) -> Result<DiagramData, GenerateError> {
    let json = extract_json(text);
    let value: Value = serde_json::from_str(&json).map_err(|e| GenerateError::InvalidJson(e.to_string()))?;
    validate_diagram(&value)
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Check a parsed payload and convert it into [`DiagramData`].
///
/// The kind is read from `type` (or `kind`), normalized to snake case.
/// Node and edge ids may be strings or numbers. A node without a label is
/// labeled with its id. Later nodes that repeat an earlier id are dropped.
///
/// # Errors
///
/// Returns [`GenerateError::MissingField`] when `type`, `nodes` or `edges` is
/// absent, [`GenerateError::UnknownKind`] for an unrecognized kind and
/// [`GenerateError::Malformed`] for entries of the wrong shape.
pub fn validate_diagram(value: &Value) -> Result<DiagramData, GenerateError> {
    let Some(object) = value.as_object() else {
        return Err(GenerateError::Malformed("top level is not an object".into()));
    };

    let raw_kind = object
        .get("type")
        .or_else(|| object.get("kind"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(GenerateError::MissingField("type"))?;
    let kind = parse_kind(raw_kind)?;

    let raw_nodes = object
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or(GenerateError::MissingField("nodes"))?;
    let raw_edges = object
        .get("edges")
        .and_then(Value::as_array)
        .ok_or(GenerateError::MissingField("edges"))?;

    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (i, raw) in raw_nodes.iter().enumerate() {
        let id = id_field(raw, "id").ok_or_else(|| GenerateError::Malformed(format!("node {i} has no id")))?;
        let label = raw
            .get("label")
            .and_then(Value::as_str)
            .map_or_else(|| id.clone(), str::to_owned);
        if !seen.insert(id.clone()) {
            warn!(%id, "generate: duplicate node id dropped");
            continue;
        }
        nodes.push(DiagramNode::new(id, label));
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for (i, raw) in raw_edges.iter().enumerate() {
        let from = id_field(raw, "from").ok_or_else(|| GenerateError::Malformed(format!("edge {i} has no from")))?;
        let to = id_field(raw, "to").ok_or_else(|| GenerateError::Malformed(format!("edge {i} has no to")))?;
        edges.push(DiagramEdge::new(from, to));
    }

    let data = DiagramData::new(kind, nodes, edges);
    let dangling = data.dangling_edges().count();
    if dangling > 0 {
        debug!(dangling, "generate: payload has edges to unknown nodes");
    }
    Ok(data)
}

fn parse_kind(raw: &str) -> Result<DiagramKind, GenerateError> {
    let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    normalized
        .parse::<DiagramKind>()
        .map_err(|_| GenerateError::UnknownKind(raw.to_string()))
}

fn id_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "llm_test.rs"]
mod tests;
