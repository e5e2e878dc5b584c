//! Turning a tree written with wildcard and alternation notation into a tree
//! of concrete calls.
//!
//! Expansion runs in two passes over a fresh copy of the tree:
//!
//! 1. Alternations (`"2m|2NT"`) are flattened into one sibling per branch.
//!    Each branch receives a full copy of the alternation's subtree; branches
//!    that land on an existing position are merged into it.
//! 2. Wildcards are bound. A [`Binding`] is threaded from the root down; a
//!    node whose notation needs a dimension the binding does not fix yet
//!    forks into one alternative per suit of that dimension, and every
//!    descendant of an alternative reuses its choice. Alternatives are built
//!    as detached trees and merged under the parent in enumeration order.
//!
//! Relay steps are spliced separately by [`splice_steps`], once the tree is
//! concrete.

use crate::macros::{Macro, MacroTable};
use crate::merge::{graft, merge_into, merge_payload};
use crate::notation::Wildcard;
use crate::tree::{ConventionTree, NodeId};
use bridge_core::{Call, Strain};
use tracing::{debug, trace};

/// The suit chosen for each wildcard dimension along one expansion branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Binding {
    major: Option<Strain>,
    minor: Option<Strain>,
    any_suit: Option<Strain>,
}

impl Binding {
    pub fn get(&self, wildcard: Wildcard) -> Option<Strain> {
        match wildcard {
            Wildcard::Major => self.major,
            Wildcard::Minor => self.minor,
            Wildcard::AnySuit => self.any_suit,
        }
    }

    pub fn with(mut self, wildcard: Wildcard, strain: Strain) -> Self {
        match wildcard {
            Wildcard::Major => self.major = Some(strain),
            Wildcard::Minor => self.minor = Some(strain),
            Wildcard::AnySuit => self.any_suit = Some(strain),
        }
        self
    }

    /// Every binding that agrees with `self` and also fixes each of
    /// `needed`. Dimensions already bound are not offered again, so a branch
    /// that committed to Hearts stays on Hearts.
    pub fn extensions(&self, needed: &[Wildcard]) -> Vec<Binding> {
        let mut bindings = vec![*self];
        for &wildcard in needed {
            if self.get(wildcard).is_some() {
                continue;
            }
            bindings = bindings
                .into_iter()
                .flat_map(|binding| {
                    wildcard
                        .choices()
                        .iter()
                        .map(move |&strain| binding.with(wildcard, strain))
                })
                .collect();
        }
        bindings
    }

    /// Substitutes every bound wildcard in `raw` and returns the concrete
    /// notation along with the macros describing the choices made.
    pub fn resolve(&self, raw: &str) -> (String, Vec<Macro>) {
        let mut resolved = raw.to_string();
        let mut macros = Vec::new();
        for wildcard in Wildcard::ALL {
            let Some(strain) = self.get(wildcard) else {
                continue;
            };
            if wildcard.occurs_in(&resolved) {
                resolved = wildcard.substitute(&resolved, strain);
                macros.extend(binding_macros(wildcard, strain));
            }
        }
        (resolved, macros)
    }
}

/// `$M`/`$OM` for a major, `$m`/`$Om` for a minor, `$X` for any suit.
fn binding_macros(wildcard: Wildcard, strain: Strain) -> Vec<Macro> {
    let chosen = strain.abbreviation();
    let other = strain.other_of_class().map_or("", Strain::abbreviation);
    match wildcard {
        Wildcard::Major => vec![Macro::literal("$M", chosen), Macro::literal("$OM", other)],
        Wildcard::Minor => vec![Macro::literal("$m", chosen), Macro::literal("$Om", other)],
        Wildcard::AnySuit => vec![Macro::literal("$X", chosen)],
    }
}

/// Fully expands `tree`: alternations flattened, wildcards bound.
pub fn expand(tree: &ConventionTree) -> ConventionTree {
    expand_with(tree, &Binding::default())
}

fn expand_with(tree: &ConventionTree, binding: &Binding) -> ConventionTree {
    bind_wildcards(&flatten_alternations(tree), binding)
}

/// Replaces every alternation child with one child per branch.
pub fn flatten_alternations(tree: &ConventionTree) -> ConventionTree {
    let root = tree.root();
    let mut flat = ConventionTree::with_root(&tree.node(root).notation.raw);
    let flat_root = flat.root();
    flatten_into(tree, root, &mut flat, flat_root);
    flat
}

fn flatten_into(
    source: &ConventionTree,
    source_id: NodeId,
    target: &mut ConventionTree,
    target_id: NodeId,
) {
    merge_payload(target.node_mut(target_id), source.node(source_id));

    for child in source.children(source_id) {
        let notation = &source.node(child).notation;
        let branches = notation.alternatives();
        if branches.is_empty() {
            let target_child = target.child_or_insert(target_id, &notation.raw);
            flatten_into(source, child, target, target_child);
            continue;
        }
        for branch in branches {
            let target_child = target.child_or_insert(target_id, &branch.raw);
            flatten_into(source, child, target, target_child);

            // The alternation itself carries no flags; each branch keeps its own.
            let node = target.node_mut(target_child);
            if branch.announceable {
                node.announceable = true;
                node.alertable = false;
            } else if branch.alertable {
                node.alertable = true;
            }
            if branch.alert_tag.is_some() {
                node.alert_tag = branch.alert_tag.clone();
            }
        }
    }
}

/// Binds every wildcard reachable from the root, starting from `binding`.
pub fn bind_wildcards(tree: &ConventionTree, binding: &Binding) -> ConventionTree {
    let root = tree.root();
    let source_root = tree.node(root);
    let mut bound = ConventionTree::with_root(&source_root.notation.raw);
    let bound_root = bound.root();
    {
        let node = bound.node_mut(bound_root);
        node.description = source_root.description.clone();
        node.priority = source_root.priority;
        node.alert_tag = source_root.alert_tag.clone();
        node.alertable = source_root.alertable;
        node.announceable = source_root.announceable;
        node.macros = source_root.macros.clone();
        node.steps = source_root
            .steps
            .iter()
            .map(|template| expand_with(template, binding))
            .collect();
    }
    let inherited = source_root.macros.clone();
    bind_children(tree, root, binding, &inherited, &mut bound, bound_root);
    bound
}

fn bind_children(
    source: &ConventionTree,
    source_id: NodeId,
    binding: &Binding,
    inherited: &MacroTable,
    target: &mut ConventionTree,
    target_id: NodeId,
) {
    for child in source.children(source_id) {
        let node = source.node(child);
        let choices = binding.extensions(node.notation.wildcards());
        if choices.len() > 1 {
            trace!(notation = %node.notation, alternatives = choices.len(), "binding wildcard");
        }

        for choice in choices {
            let (raw, injected) = choice.resolve(&node.notation.raw);

            let mut alternative = ConventionTree::with_root(&raw);
            let alternative_root = alternative.root();
            let scope = {
                let copy = alternative.node_mut(alternative_root);
                copy.description = node.description.clone();
                copy.priority = node.priority;
                copy.alert_tag = node.alert_tag.clone();
                copy.alertable = node.alertable;
                copy.announceable = node.announceable;
                copy.macros = node.macros.clone();
                // First definition wins: skip what an ancestor already says.
                for rule in injected {
                    if !inherited.contains(&rule) {
                        copy.macros.push_unique(rule);
                    }
                }
                copy.steps = node
                    .steps
                    .iter()
                    .map(|template| expand_with(template, &choice))
                    .collect();

                let mut scope = inherited.clone();
                scope.extend_unique(&copy.macros);
                scope
            };

            bind_children(
                source,
                child,
                &choice,
                &scope,
                &mut alternative,
                alternative_root,
            );
            graft(target, target_id, &alternative);
        }
    }
}

/// Splices every node's relay steps in as consecutive children, then clears
/// the steps. Each step is one call above the previous one, starting above
/// the last contract bid on the way to the node (1C when there is none).
/// Spliced children are always alertable.
pub fn splice_steps(tree: &mut ConventionTree) {
    let root = tree.root();
    splice_at(tree, root);
}

fn splice_at(tree: &mut ConventionTree, id: NodeId) {
    let steps = std::mem::take(&mut tree.node_mut(id).steps);
    if !steps.is_empty() {
        let mut cursor = last_contract_bid(tree, id);
        for (index, template) in steps.iter().enumerate() {
            let next = match cursor {
                Some(call) => call.next_step(),
                None => Call::bid(1, Strain::Clubs),
            };
            let Some(step) = next else {
                debug!(
                    sequence = %tree.sequence_string(id),
                    dropped = steps.len() - index,
                    "relay steps run past 7NT"
                );
                break;
            };
            cursor = Some(step);

            let child = tree.call_child_or_insert(id, step);
            merge_into(tree, child, template, template.root());
            tree.node_mut(child).alertable = true;
        }
        debug!(sequence = %tree.sequence_string(id), steps = steps.len(), "spliced relay steps");
    }

    let children: Vec<NodeId> = tree.children(id).collect();
    for child in children {
        splice_at(tree, child);
    }
}

fn last_contract_bid(tree: &ConventionTree, id: NodeId) -> Option<Call> {
    tree.ancestors(id)
        .filter_map(|node| tree.node(node).call())
        .find(Call::is_bid)
}
