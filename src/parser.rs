pub mod discover;
pub mod doc_comment;
pub mod enum_info;
pub mod members;

pub use discover::{discover_enums, EnumMatch};
pub use enum_info::{EnumRecord, MemberRecord};
pub use members::{extract_members, MemberList};

use crate::error::{IoResultExt, ScanError, ScanResult};
use std::path::{Path, PathBuf};
use tree_sitter::{Parser, Tree};

/// A parsed document: the tree together with the text it was parsed from.
pub struct SourceTree {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
}

pub(crate) fn node_text<'s>(node: tree_sitter::Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Produces a syntax tree for a document, or fails for that document only.
pub trait TreeAcquirer: Send + Sync {
    fn acquire(&self, path: &Path) -> ScanResult<SourceTree>;
}

/// C# tree acquirer backed by tree-sitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct CSharpParser;

impl CSharpParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_source(&self, path: &Path, source: String) -> ScanResult<SourceTree> {
        // Parser is not Sync, so each call gets its own
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| ScanError::parse(path, format!("failed to load C# grammar: {e}")))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ScanError::parse(path, "parser produced no tree"))?;

        Ok(SourceTree {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }
}

impl TreeAcquirer for CSharpParser {
    fn acquire(&self, path: &Path) -> ScanResult<SourceTree> {
        let mut content = std::fs::read_to_string(path).with_path(path)?;
        if content.starts_with('\u{feff}') {
            content.remove(0);
        }
        self.parse_source(path, content)
    }
}
