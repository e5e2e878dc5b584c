//! Compiles a bidding-system document into a tree of legal auctions.
//!
//! ```text
//! YAML document ──ingest──▶ raw tree ──expand──▶ concrete tree
//!     ──splice steps──▶ relays filled in ──prune──▶ ConventionTree
//! ```

pub mod error;
pub mod expand;
pub mod ingest;
pub mod macros;
pub mod merge;
pub mod notation;
pub mod prune;
pub mod render;
pub mod tree;

pub use error::IngestError;
pub use macros::{Macro, MacroTable};
pub use notation::{Notation, NotationKind, Wildcard};
pub use render::NodeView;
pub use tree::{ConventionNode, ConventionTree, NodeId, NodeKey};

use serde_yaml::Value;
use tracing::info;

/// Knobs for [`compile`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Placed on the root ahead of the document's own `define` block.
    pub global_macros: MacroTable,
    pub splice_steps: bool,
    pub prune: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            global_macros: MacroTable::new(),
            splice_steps: true,
            prune: true,
        }
    }
}

pub fn compile(document: &Value, options: &CompileOptions) -> Result<ConventionTree, IngestError> {
    let raw = ingest::build_from_document(document, &options.global_macros)?;
    let mut tree = expand::expand(&raw);
    if options.splice_steps {
        expand::splice_steps(&mut tree);
    }
    let pruned = if options.prune {
        prune::prune(&mut tree)
    } else {
        0
    };

    info!(
        declared = raw.len(),
        compiled = tree.len(),
        pruned,
        "compiled bidding system"
    );
    Ok(tree)
}

pub fn compile_str(text: &str, options: &CompileOptions) -> Result<ConventionTree, IngestError> {
    let document: Value = serde_yaml::from_str(text)?;
    compile(&document, options)
}
