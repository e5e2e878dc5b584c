//! Display data for a compiled tree.
//!
//! Nothing here produces markup: a [`NodeView`] is plain data (call text,
//! flags and the description with every macro and placeholder resolved) for
//! whatever formatter sits on top.

use crate::tree::{ConventionNode, ConventionTree, NodeId};
use bridge_core::{Call, Strain};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

static DEPTH_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    /// `None` for the root.
    pub call: Option<String>,
    pub label: String,
    pub strain: Option<Strain>,
    pub alert_tag: Option<String>,
    pub alertable: bool,
    pub announceable: bool,
    pub description: Option<String>,
    pub sequence: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView>,
}

impl ConventionNode {
    /// The call followed by ` (tag)` when the node carries an alert tag.
    pub fn label(&self) -> String {
        let call = self
            .call()
            .map_or_else(|| self.notation.raw.clone(), Call::render);
        match &self.alert_tag {
            Some(tag) if !tag.is_empty() => format!("{call} ({tag})"),
            _ => call,
        }
    }
}

impl ConventionTree {
    /// The node's description with macros applied inside-out.
    ///
    /// Starting at the node (depth 0) and walking to the root, each
    /// ancestor's macros run over the text, then `$<depth>` is replaced by
    /// that ancestor's strain ("" for Pass, Double, Redouble and the root).
    pub fn resolved_description(&self, id: NodeId) -> Option<String> {
        let mut text = self.node(id).description.clone()?;
        for (depth, ancestor) in self.ancestors(id).enumerate() {
            let node = self.node(ancestor);
            text = node.macros.apply(&text);
            let strain = node
                .call()
                .and_then(|call| call.strain())
                .map_or("", Strain::abbreviation);
            text = DEPTH_PLACEHOLDER
                .replace_all(&text, |caps: &Captures| {
                    if caps[1].parse::<usize>().ok() == Some(depth) {
                        strain.to_string()
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned();
        }
        Some(text.trim().to_string())
    }

    /// The display data for `id` and everything below it. Children are
    /// listed in bidding-box order.
    pub fn view(&self, id: NodeId) -> NodeView {
        let node = self.node(id);
        let call = node.call();

        let mut children: Vec<NodeId> = self.children(id).collect();
        children.sort_by_key(|&child| box_position(self.node(child).call()));

        NodeView {
            call: call.map(Call::render),
            label: if self.parent(id).is_some() {
                node.label()
            } else {
                String::new()
            },
            strain: call.and_then(|call| call.strain()),
            alert_tag: node.alert_tag.clone(),
            alertable: node.alertable,
            announceable: node.announceable,
            description: self.resolved_description(id),
            sequence: self.sequence_string(id),
            children: children.into_iter().map(|child| self.view(child)).collect(),
        }
    }
}

// Unresolved positions sort after every call.
fn box_position(call: Option<Call>) -> usize {
    call.and_then(|call| Call::ALL.iter().position(|&c| c == call))
        .unwrap_or(Call::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::Macro;

    #[test]
    fn test_macros_apply_inside_out() {
        let mut tree = ConventionTree::new();
        let root = tree.root();
        tree.node_mut(root).macros.push(Macro::literal("$hcp", "HCP"));
        let one_nt = tree.path_or_insert(root, &["1NT"]);
        tree.node_mut(one_nt)
            .macros
            .push(Macro::literal("$range", "15-17 $hcp"));
        let leaf = tree.path_or_insert(one_nt, &["P", "2NT"]);
        tree.node_mut(leaf).description = Some("  invites opposite $range  ".into());

        assert_eq!(
            tree.resolved_description(leaf).as_deref(),
            Some("invites opposite 15-17 HCP")
        );
    }

    #[test]
    fn test_depth_placeholders() {
        let mut tree = ConventionTree::new();
        let leaf = tree.path_or_insert(tree.root(), &["1H", "P", "2S"]);
        tree.node_mut(leaf).description = Some("$0 over $2, P at $1".into());
        assert_eq!(
            tree.resolved_description(leaf).as_deref(),
            Some("S over H, P at")
        );
    }

    #[test]
    fn test_deep_placeholders_are_not_shadowed() {
        let mut tree = ConventionTree::new();
        let path = ["1C", "P", "1D", "P", "1H", "P", "1S", "P", "1NT", "P", "2C"];
        let leaf = tree.path_or_insert(tree.root(), &path);
        tree.node_mut(leaf).description = Some("opened $10, then $1$0 and $2".into());
        assert_eq!(
            tree.resolved_description(leaf).as_deref(),
            Some("opened C, then C and NT")
        );
    }

    #[test]
    fn test_closest_macro_wins() {
        let mut tree = ConventionTree::new();
        let root = tree.root();
        tree.node_mut(root).macros.push(Macro::literal("$M", "major"));
        let hearts = tree.path_or_insert(root, &["1H"]);
        tree.node_mut(hearts).macros.push(Macro::literal("$M", "H"));
        tree.node_mut(hearts).description = Some("five $M".into());
        assert_eq!(tree.resolved_description(hearts).as_deref(), Some("five H"));
    }

    #[test]
    fn test_missing_description() {
        let mut tree = ConventionTree::new();
        let node = tree.path_or_insert(tree.root(), &["1C"]);
        assert_eq!(tree.resolved_description(node), None);
    }

    #[test]
    fn test_label_includes_alert_tag() {
        let mut tree = ConventionTree::new();
        let stayman = tree.path_or_insert(tree.root(), &["1NT", "P", "2C![Stayman]"]);
        assert_eq!(tree.node(stayman).label(), "2C (Stayman)");
        let plain = tree.path_or_insert(tree.root(), &["1NT", "P", "2D"]);
        assert_eq!(tree.node(plain).label(), "2D");
    }

    #[test]
    fn test_view_sorts_children_and_serializes() {
        let mut tree = ConventionTree::new();
        for call in ["2C", "1NT", "P", "1C"] {
            let node = tree.path_or_insert(tree.root(), &[call]);
            tree.node_mut(node).description = Some(format!("opening {call}"));
        }
        let view = tree.view(tree.root());
        let order: Vec<&str> = view.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(order, vec!["P", "1C", "1NT", "2C"]);
        assert_eq!(view.label, "");
        assert_eq!(view.children[2].strain, Some(Strain::NoTrump));

        let json = serde_json::to_value(&view.children[1]).unwrap();
        assert_eq!(json["call"], "1C");
        assert_eq!(json["strain"], "Clubs");
        assert_eq!(json["description"], "opening 1C");
        assert!(json.get("children").is_none());
    }
}
