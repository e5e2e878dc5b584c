use bridge_core::{Auction, Call};
use convention_engine::ingest::macros_from_mapping;
use convention_engine::{ConventionTree, IngestError, MacroTable, NodeId, NodeKey, NodeView};
use serde_yaml::Value;
use std::fmt::Write;

/// Indented outline of `view` and its children, one position per line.
pub fn render_text(view: &NodeView) -> String {
    let mut out = String::new();
    if view.label.is_empty() {
        if let Some(description) = &view.description {
            let _ = writeln!(out, "{description}");
        }
        for child in &view.children {
            write_node(&mut out, child, 0);
        }
    } else {
        write_node(&mut out, view, 0);
    }
    out
}

fn write_node(out: &mut String, view: &NodeView, depth: usize) {
    let indent = "  ".repeat(depth);
    let mark = if view.announceable {
        " [announce]"
    } else if view.alertable {
        " [alert]"
    } else {
        ""
    };
    let head = format!("{}{}", view.label, mark);
    let line = match &view.description {
        Some(description) => format!("{indent}{head:<16} {description}"),
        None => format!("{indent}{head}"),
    };
    let _ = writeln!(out, "{}", line.trim_end());

    for child in &view.children {
        write_node(out, child, depth + 1);
    }
}

/// Calls legal at `id` that the system says nothing about.
pub fn undefined_calls(tree: &ConventionTree, id: NodeId) -> Vec<Call> {
    let Some(history) = tree.sequence(id) else {
        return Vec::new();
    };
    Auction::legal_next_calls(&history)
        .into_iter()
        .filter(|call| tree.child(id, &NodeKey::Call(*call)).is_none())
        .collect()
}

/// Reads global macros from YAML: either a `define` block or a bare mapping
/// of pattern to replacement.
pub fn parse_macros(text: &str) -> Result<MacroTable, IngestError> {
    let document: Value = serde_yaml::from_str(text)?;
    let mapping = match (document.get("define"), &document) {
        (Some(Value::Mapping(define)), _) => define,
        (_, Value::Mapping(mapping)) => mapping,
        _ => return Err(IngestError::RootNotMapping),
    };
    macros_from_mapping(mapping)
}
