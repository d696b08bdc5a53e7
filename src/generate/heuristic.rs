//! Local generator: keyword-driven templates, no network.
//!
//! The kind is detected from the lower-cased prompt (first match wins):
//!
//! | Keywords | Kind |
//! |----------|------|
//! | `timeline`, `chronolog`, `history` | timeline |
//! | `org chart`, `organization`, `hierarchy`, `team` | org chart |
//! | `decision`, `choice`, the word `if` | decision tree |
//! | `architecture`, `system`, `microservice` | architecture |
//! | anything else | flowchart |
//!
//! Each kind has one template, with label swaps for a few topical keywords.

use canvas::model::{DiagramData, DiagramEdge, DiagramKind, DiagramNode};

use super::{DiagramGenerator, GenerateError, validate_prompt};

pub struct HeuristicGenerator;

#[async_trait::async_trait]
impl DiagramGenerator for HeuristicGenerator {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn generate(&self, prompt: &str) -> Result<DiagramData, GenerateError> {
        let prompt = validate_prompt(prompt)?;
        Ok(generate(prompt))
    }
}

/// Build a diagram for `prompt` without validation.
#[must_use]
pub fn generate(prompt: &str) -> DiagramData {
    let lower = prompt.to_lowercase();
    match detect_kind(&lower) {
        DiagramKind::Flowchart => flowchart(&lower),
        DiagramKind::OrgChart => org_chart(&lower),
        DiagramKind::DecisionTree => decision_tree(&lower),
        DiagramKind::Timeline => timeline(&lower),
        DiagramKind::Architecture => architecture(&lower),
    }
}

/// Pick a kind from a lower-cased prompt.
#[must_use]
pub fn detect_kind(lower: &str) -> DiagramKind {
    let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if any(&["timeline", "chronolog", "history"]) {
        DiagramKind::Timeline
    } else if any(&["org chart", "organization", "hierarchy", "team"]) {
        DiagramKind::OrgChart
    } else if any(&["decision", "choice"]) || has_word(lower, "if") {
        DiagramKind::DecisionTree
    } else if any(&["architecture", "system", "microservice"]) {
        DiagramKind::Architecture
    } else {
        DiagramKind::Flowchart
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}

// =============================================================================
// TEMPLATES
// =============================================================================

/// Nodes `"1"..` with the given labels.
fn numbered(labels: &[&str]) -> Vec<DiagramNode> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| DiagramNode::new((i + 1).to_string(), *label))
        .collect()
}

fn edges(pairs: &[(u8, u8)]) -> Vec<DiagramEdge> {
    pairs
        .iter()
        .map(|(from, to)| DiagramEdge::new(from.to_string(), to.to_string()))
        .collect()
}

/// Edges `1 -> 2 -> ... -> n`.
fn chain(nodes: &[DiagramNode]) -> Vec<DiagramEdge> {
    nodes
        .windows(2)
        .map(|pair| DiagramEdge::new(pair[0].id.clone(), pair[1].id.clone()))
        .collect()
}

fn flowchart(lower: &str) -> DiagramData {
    let steps: &[&str] = if lower.contains("authentication") || lower.contains("login") {
        &["Start", "Enter Credentials", "Validate Input", "Check Database", "Generate Token", "Login Success"]
    } else if lower.contains("checkout") || lower.contains("purchase") {
        &["Start", "Add to Cart", "Review Cart", "Enter Payment", "Process Payment", "Order Complete"]
    } else {
        &["Start", "Input Data", "Process", "Validate", "Complete"]
    };
    let nodes = numbered(steps);
    let edges = chain(&nodes);
    DiagramData::new(DiagramKind::Flowchart, nodes, edges)
}

fn org_chart(lower: &str) -> DiagramData {
    let labels: [&str; 8] = if lower.contains("startup") {
        ["Founder/CEO", "CTO", "CFO", "COO", "Engineering", "Dev Team", "Marketing", "Operations"]
    } else {
        ["CEO", "CTO", "CFO", "COO", "Engineering", "Product", "Finance Team", "Operations"]
    };
    DiagramData::new(
        DiagramKind::OrgChart,
        numbered(&labels),
        edges(&[(1, 2), (1, 3), (1, 4), (2, 5), (2, 6), (3, 7), (4, 8)]),
    )
}

fn decision_tree(lower: &str) -> DiagramData {
    let labels: [&str; 7] = if lower.contains("cloud") {
        [
            "Choose Cloud Provider",
            "Need Flexibility?",
            "Need Integration?",
            "Yes - AWS",
            "Yes - Azure",
            "Use AWS",
            "Use Azure",
        ]
    } else {
        ["Start", "Evaluate Option A", "Evaluate Option B", "Choose A", "Choose B", "Result A", "Result B"]
    };
    DiagramData::new(
        DiagramKind::DecisionTree,
        numbered(&labels),
        edges(&[(1, 2), (1, 3), (2, 4), (3, 5), (4, 6), (5, 7)]),
    )
}

fn timeline(lower: &str) -> DiagramData {
    let labels: [&str; 4] = if lower.contains("web") {
        ["2010 - HTML5", "2015 - React", "2020 - Next.js", "2024 - AI Tools"]
    } else {
        ["2010", "2015", "2020", "2025"]
    };
    let nodes = numbered(&labels);
    let edges = chain(&nodes);
    DiagramData::new(DiagramKind::Timeline, nodes, edges)
}

fn architecture(lower: &str) -> DiagramData {
    let commerce = lower.contains("commerce") || lower.contains("shop");
    let mut labels = vec!["Client", "API Gateway", "Auth Service", "User Service", "Database", "Cache"];
    let mut pairs = vec![(1, 2), (2, 3), (2, 4), (4, 5), (4, 6)];
    if commerce {
        labels[3] = "Product Service";
        labels[4] = "Order Service";
        labels.push("Payment Service");
        pairs.push((2, 7));
    }
    DiagramData::new(DiagramKind::Architecture, numbered(&labels), edges(&pairs))
}

#[cfg(test)]
#[path = "heuristic_test.rs"]
mod tests;
