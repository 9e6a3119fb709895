//! Finds every enum declaration in a tree, at any nesting depth.
//!
//! Traversal is a pre-order walk, which visits declarations in the order
//! their first characters appear in the source.

use super::{node_text, SourceTree};
use tree_sitter::Node;

pub const ENUM_DECLARATION: &str = "enum_declaration";

/// An enum declaration node with its resolved name and location.
#[derive(Debug, Clone, Copy)]
pub struct EnumMatch<'t> {
    pub node: Node<'t>,
    pub name: &'t str,
    /// Zero-based line of the declaration's first character
    pub line_number: usize,
}

/// All enum declarations in `tree`, in document order.
///
/// Declarations recovered without an identifier have no usable location and
/// are skipped.
pub fn discover_enums(tree: &SourceTree) -> Vec<EnumMatch<'_>> {
    enum_declarations(tree.tree.root_node())
        .into_iter()
        .filter_map(|node| {
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, &tree.source))
                .filter(|name| !name.is_empty())?;
            Some(EnumMatch {
                node,
                name,
                line_number: node.start_position().row,
            })
        })
        .collect()
}

/// Pre-order search for `enum_declaration` nodes under (and including) `root`.
pub fn enum_declarations(root: Node<'_>) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if node.kind() == ENUM_DECLARATION {
            found.push(node);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return found;
            }
        }
    }
}
