//! Building a convention tree from a YAML bidding-system document.
//!
//! The document is a mapping whose keys are either reserved words or
//! bidding sequences:
//!
//! ```yaml
//! define:
//!   \$hcp: "high card points"
//! 1NT:
//!   description: 15-17 $hcp
//!   2C!![Stayman]: asks for a major      # after an implied pass: 1NT-P-2C
//!   2D!|2H!: transfer
//!   conventions:
//!     X: penalty                         # no implied pass: 1NT-X
//! 1M, 1m: natural
//! /:
//!   1NT: balancing                       # P-1NT
//! ```
//!
//! Reserved keys: `define` (macros for the enclosing node), `conventions` and
//! `-` (a scope whose sequences follow directly), `/` (a scope whose
//! sequences follow an implied pass), `steps` (relay answers after an
//! implied pass), `-steps` (relay answers directly) and `description`.
//! Every other key names one or more sequences; a scalar value is shorthand
//! for a description, a mapping describes the position and nests further
//! sequences after an implied pass.

use crate::error::IngestError;
use crate::macros::{Macro, MacroTable};
use crate::notation::Notation;
use crate::tree::{split_sequence, ConventionTree, NodeId};
use bridge_core::Call;
use serde_yaml::{Mapping, Value};
use tracing::warn;

enum Entry<'a> {
    Define(&'a Mapping),
    Scope { body: &'a Mapping, implied_pass: bool },
    Steps { steps: &'a [Value], implied_pass: bool },
    Description(Option<String>),
    Conventions { sequences: Vec<String>, body: Body<'a> },
}

enum Body<'a> {
    Description(Option<String>),
    Mapping(&'a Mapping),
}

/// Builds the unexpanded tree for `document`. `global_macros` are placed on
/// the root ahead of the document's own root-level `define` block.
pub fn build_from_document(
    document: &Value,
    global_macros: &MacroTable,
) -> Result<ConventionTree, IngestError> {
    let Value::Mapping(mapping) = document else {
        return Err(IngestError::RootNotMapping);
    };

    let mut ingest = Ingest::default();
    let root = ingest.tree.root();
    ingest.tree.node_mut(root).macros.extend_unique(global_macros);
    ingest.mapping(mapping, root, false)?;
    Ok(ingest.tree)
}

/// Parses `text` as YAML, then builds as [`build_from_document`].
pub fn build_from_str(text: &str, global_macros: &MacroTable) -> Result<ConventionTree, IngestError> {
    let document: Value = serde_yaml::from_str(text)?;
    build_from_document(&document, global_macros)
}

/// Reads a `define`-style mapping of pattern to replacement.
pub fn macros_from_mapping(mapping: &Mapping) -> Result<MacroTable, IngestError> {
    mapping
        .iter()
        .map(|(pattern, replacement)| {
            let (Some(pattern), Some(replacement)) = (scalar(pattern), scalar(replacement)) else {
                return Err(IngestError::MalformedMacro {
                    found: describe(pattern),
                });
            };
            Macro::new(&pattern, &replacement)
                .map_err(|source| IngestError::InvalidMacro { pattern, source })
        })
        .collect()
}

#[derive(Default)]
struct Ingest {
    tree: ConventionTree,
    // Declaration order across the whole document, step templates included.
    priority: u32,
}

impl Ingest {
    fn next_priority(&mut self) -> u32 {
        self.priority += 1;
        self.priority
    }

    fn mapping(&mut self, mapping: &Mapping, node: NodeId, implied_pass: bool) -> Result<(), IngestError> {
        for (key, value) in mapping {
            match classify(key, value)? {
                Entry::Define(macros) => {
                    let table = macros_from_mapping(macros)?;
                    self.tree.node_mut(node).macros.extend_unique(&table);
                }
                Entry::Scope { body, implied_pass } => self.mapping(body, node, implied_pass)?,
                Entry::Steps { steps, implied_pass } => self.steps(node, steps, implied_pass)?,
                Entry::Description(text) => {
                    let priority = self.next_priority();
                    let target = self.tree.node_mut(node);
                    target.description = text;
                    target.priority = priority;
                }
                Entry::Conventions { sequences, body } => {
                    self.conventions(node, &sequences, &body, implied_pass)?
                }
            }
        }
        Ok(())
    }

    fn conventions(
        &mut self,
        parent: NodeId,
        sequences: &[String],
        body: &Body<'_>,
        implied_pass: bool,
    ) -> Result<(), IngestError> {
        // Every sequence of one key is declared at the same point of the
        // document, so they all share its priorities.
        let start = self.priority;
        let mut end = start;

        for sequence in sequences {
            self.priority = start;
            let mut path = split_sequence(sequence);
            if implied_pass {
                path.insert(0, Call::Pass.render());
            }
            for raw in &path {
                if Notation::parse(raw).is_opaque() {
                    warn!(sequence = %sequence, notation = %raw, "unrecognized call notation");
                }
            }

            let priority = self.next_priority();
            let node = self.tree.path_or_insert(parent, &path);
            self.tree.node_mut(node).priority = priority;
            match body {
                Body::Description(text) => self.tree.node_mut(node).description = text.clone(),
                Body::Mapping(mapping) => self.mapping(mapping, node, true)?,
            }
            end = end.max(self.priority);
        }

        self.priority = end;
        Ok(())
    }

    fn steps(&mut self, node: NodeId, steps: &[Value], implied_pass: bool) -> Result<(), IngestError> {
        let target = if implied_pass {
            self.tree.call_child_or_insert(node, Call::Pass)
        } else {
            node
        };
        for step in steps {
            let template = self.template(step)?;
            self.tree.node_mut(target).steps.push(template);
        }
        Ok(())
    }

    fn template(&mut self, step: &Value) -> Result<ConventionTree, IngestError> {
        let mut nested = Ingest {
            tree: ConventionTree::new(),
            priority: self.priority,
        };
        let root = nested.tree.root();
        match step {
            Value::Mapping(mapping) => nested.mapping(mapping, root, true)?,
            other => {
                let text = scalar(other).ok_or_else(|| IngestError::MalformedStep {
                    found: describe(other),
                })?;
                let priority = nested.next_priority();
                let node = nested.tree.node_mut(root);
                node.description = Some(text);
                node.priority = priority;
            }
        }
        self.priority = nested.priority;
        Ok(nested.tree)
    }
}

fn classify<'a>(key: &'a Value, value: &'a Value) -> Result<Entry<'a>, IngestError> {
    match key {
        Value::String(name) => match (name.as_str(), value) {
            ("define", Value::Mapping(macros)) => Ok(Entry::Define(macros)),
            ("conventions" | "-", Value::Mapping(body)) => Ok(Entry::Scope {
                body,
                implied_pass: false,
            }),
            ("/", Value::Mapping(body)) => Ok(Entry::Scope {
                body,
                implied_pass: true,
            }),
            ("steps", Value::Sequence(steps)) => Ok(Entry::Steps {
                steps,
                implied_pass: true,
            }),
            ("-steps", Value::Sequence(steps)) => Ok(Entry::Steps {
                steps,
                implied_pass: false,
            }),
            ("description", Value::Null) => Ok(Entry::Description(None)),
            ("description", text) => scalar(text)
                .map(|text| Entry::Description(Some(text)))
                .ok_or_else(|| reserved(name, "description string")),
            ("define", _) => Err(reserved(name, "mapping of macros")),
            ("conventions" | "-" | "/", _) => Err(reserved(name, "mapping of sequences")),
            ("steps" | "-steps", _) => Err(reserved(name, "list of steps")),
            (sequences, _) => Ok(Entry::Conventions {
                sequences: sequences
                    .split(',')
                    .map(str::trim)
                    .filter(|sequence| !sequence.is_empty())
                    .map(str::to_string)
                    .collect(),
                body: body(key, value)?,
            }),
        },
        Value::Sequence(keys) => Ok(Entry::Conventions {
            sequences: keys
                .iter()
                .map(|sequence| {
                    sequence
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| IngestError::NonScalarSequenceKey {
                            found: describe(sequence),
                        })
                })
                .collect::<Result<_, _>>()?,
            body: body(key, value)?,
        }),
        _ => Err(IngestError::UnexpectedEntry {
            key: describe(key),
        }),
    }
}

fn body<'a>(key: &Value, value: &'a Value) -> Result<Body<'a>, IngestError> {
    match value {
        Value::Mapping(mapping) => Ok(Body::Mapping(mapping)),
        Value::Null => Ok(Body::Description(None)),
        other => scalar(other)
            .map(|text| Body::Description(Some(text)))
            .ok_or_else(|| IngestError::UnexpectedEntry { key: describe(key) }),
    }
}

fn reserved(key: &str, expected: &'static str) -> IngestError {
    IngestError::ReservedKey {
        key: key.to_string(),
        expected,
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|text| text.trim_end().to_string())
        .unwrap_or_else(|_| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::Macro;

    fn build(yaml: &str) -> ConventionTree {
        build_from_str(yaml, &MacroTable::new()).unwrap()
    }

    fn description(tree: &ConventionTree, sequence: &str) -> Option<String> {
        tree.lookup(sequence)
            .and_then(|id| tree.node(id).description.clone())
    }

    #[test]
    fn test_scalar_and_nested_descriptions() {
        let tree = build(
            r#"
1NT:
  description: 15-17
  2C: stayman
"#,
        );
        assert_eq!(description(&tree, "1NT").as_deref(), Some("15-17"));
        assert_eq!(description(&tree, "1NT-P-2C").as_deref(), Some("stayman"));
        assert!(tree.lookup("1NT-2C").is_none());
    }

    #[test]
    fn test_conventions_scope_has_no_implied_pass() {
        let tree = build(
            r#"
1C:
  conventions:
    X: takeout
  "-":
    1H: overcall
"#,
        );
        assert_eq!(description(&tree, "1C-X").as_deref(), Some("takeout"));
        assert_eq!(description(&tree, "1C-1H").as_deref(), Some("overcall"));
    }

    #[test]
    fn test_slash_scope_and_slash_sequence() {
        let tree = build(
            r#"
/:
  1NT: fourth seat
1C/1H: response
"#,
        );
        assert_eq!(description(&tree, "P-1NT").as_deref(), Some("fourth seat"));
        assert_eq!(description(&tree, "1C-P-1H").as_deref(), Some("response"));
    }

    #[test]
    fn test_multiple_sequence_keys() {
        let tree = build(
            r#"
1C, 1D: minor
? [1H, 1S]
: major
"#,
        );
        for sequence in ["1C", "1D"] {
            assert_eq!(description(&tree, sequence).as_deref(), Some("minor"));
        }
        for sequence in ["1H", "1S"] {
            assert_eq!(description(&tree, sequence).as_deref(), Some("major"));
        }
        let clubs = tree.node(tree.lookup("1C").unwrap()).priority;
        let diamonds = tree.node(tree.lookup("1D").unwrap()).priority;
        assert_eq!(clubs, diamonds);
    }

    #[test]
    fn test_later_entries_have_higher_priority() {
        let tree = build(
            r#"
1C: first
1D:
  description: second
  1H: third
"#,
        );
        let priority = |sequence| tree.node(tree.lookup(sequence).unwrap()).priority;
        assert!(priority("1C") < priority("1D"));
        assert!(priority("1D") < priority("1D-P-1H"));
    }

    #[test]
    fn test_define_attaches_macros_to_scope() {
        let tree = build(
            r#"
define:
  \$hcp: HCP
1NT:
  define:
    (\d+)-(\d+): ${1} to ${2}
  description: 15-17 $hcp
"#,
        );
        let root = tree.node(tree.root());
        assert!(root.macros.contains(&Macro::new(r"\$hcp", "HCP").unwrap()));
        let one_nt = tree.node(tree.lookup("1NT").unwrap());
        assert_eq!(one_nt.macros.len(), 1);
    }

    #[test]
    fn test_global_macros_come_first() {
        let globals: MacroTable = [Macro::literal("$g", "global")].into_iter().collect();
        let tree = build_from_str("define:\n  a: b\n", &globals).unwrap();
        let patterns: Vec<&str> = tree.node(tree.root()).macros.iter().map(Macro::pattern).collect();
        assert_eq!(patterns, vec![r"\$g", "a"]);
    }

    #[test]
    fn test_steps_placement() {
        let tree = build(
            r#"
1C:
  steps:
    - balanced
    - description: hearts
      1NT: ask
2C:
  -steps:
    - any
"#,
        );
        let pass = tree.node(tree.lookup("1C-P").unwrap());
        assert_eq!(pass.steps.len(), 2);
        let first = &pass.steps[0];
        assert_eq!(first.node(first.root()).description.as_deref(), Some("balanced"));
        let second = &pass.steps[1];
        assert!(second.lookup("P-1NT").is_some());

        assert_eq!(tree.node(tree.lookup("2C").unwrap()).steps.len(), 1);
        assert!(tree.lookup("2C-P").is_none());
    }

    #[test]
    fn test_null_value_declares_position() {
        let tree = build("1C-1H: ~\n");
        let node = tree.lookup("1C-1H").unwrap();
        assert!(!tree.node(node).has_description());
    }

    #[test]
    fn test_alert_notation_is_kept_on_node() {
        let tree = build("1NT-2C!![Stayman]: asks\n");
        let node = tree.node(tree.lookup("1NT-2C").unwrap());
        assert!(node.announceable);
        assert_eq!(node.alert_tag.as_deref(), Some("Stayman"));
        assert_eq!(node.notation.raw, "2C!![Stayman]");
    }

    #[test]
    fn test_malformed_documents() {
        let cases = [
            "- 1C\n- 1D\n",
            "define: [a, b]\n",
            "define:\n  \"(\": x\n",
            "conventions: text\n",
            "steps:\n  one: two\n",
            "1C:\n  steps:\n    - [nested]\n",
            "? [1C, [1D]]\n: text\n",
            "1C: [a, b]\n",
        ];
        for yaml in cases {
            assert!(
                build_from_str(yaml, &MacroTable::new()).is_err(),
                "{yaml:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_error_kinds() {
        let err = build_from_str("just text", &MacroTable::new()).unwrap_err();
        assert!(matches!(err, IngestError::RootNotMapping));

        let err = build_from_str("define:\n  \"(\": x\n", &MacroTable::new()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidMacro { ref pattern, .. } if pattern == "("));

        let err = build_from_str("1C: [\n", &MacroTable::new()).unwrap_err();
        assert!(matches!(err, IngestError::Yaml(_)));
    }
}
