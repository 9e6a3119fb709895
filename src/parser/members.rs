use super::doc_comment::{member_summary, CommentTrivia};
use super::enum_info::MemberRecord;
use super::node_text;
use tree_sitter::Node;

const MEMBER_LIST: &str = "enum_member_declaration_list";
const MEMBER: &str = "enum_member_declaration";
const COMMENT: &str = "comment";
const ERROR: &str = "ERROR";

/// Conditional branches whose members are reported as if unconditional.
const PREPROC_BRANCHES: [&str; 3] = ["preproc_if", "preproc_elif", "preproc_else"];

/// Directives that may sit between members without ending their trivia.
const PREPROC_TRIVIA: [&str; 9] = [
    "preproc_region",
    "preproc_endregion",
    "preproc_line",
    "preproc_pragma",
    "preproc_nullable",
    "preproc_error",
    "preproc_warning",
    "preproc_define",
    "preproc_undef",
];

/// Members of one enum body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemberList {
    pub members: Vec<MemberRecord>,
    /// The body did not parse cleanly, so members may be missing.
    pub has_errors: bool,
}

/// Extract the members of an `enum_declaration` node, in declaration order.
///
/// Members inside `#if`/`#elif`/`#else` branches are included. Members the
/// parser could only recover inside an error node are included when they
/// still form a member declaration.
pub fn extract_members(declaration: Node<'_>, source: &str) -> MemberList {
    let mut list = MemberList {
        has_errors: declaration.has_error(),
        ..Default::default()
    };
    if let Some(body) = member_list(declaration) {
        collect_members(body, source, &mut list.members);
    }
    list
}

fn collect_members(parent: Node<'_>, source: &str, members: &mut Vec<MemberRecord>) {
    let mut cursor = parent.walk();
    for child in parent.named_children(&mut cursor) {
        match child.kind() {
            MEMBER => members.extend(extract_member(child, source)),
            ERROR => collect_members(child, source, members),
            kind if PREPROC_BRANCHES.contains(&kind) => collect_members(child, source, members),
            _ => {}
        }
    }
}

fn member_list(declaration: Node<'_>) -> Option<Node<'_>> {
    declaration.child_by_field_name("body").or_else(|| {
        let mut cursor = declaration.walk();
        let list = declaration
            .named_children(&mut cursor)
            .find(|child| child.kind() == MEMBER_LIST);
        list
    })
}

fn extract_member(member: Node<'_>, source: &str) -> Option<MemberRecord> {
    let name = node_text(member.child_by_field_name("name")?, source);

    let value_text = initializer(member)
        .map(|value| node_text(value, source))
        .unwrap_or_default();

    let trivia = leading_comments(member, source);
    let comment_text = member_summary(&trivia);

    Some(MemberRecord::new(name, value_text, comment_text))
}

/// The expression after `=`, if the member has one.
fn initializer(member: Node<'_>) -> Option<Node<'_>> {
    if let Some(value) = member.child_by_field_name("value") {
        return Some(value);
    }
    let mut cursor = member.walk();
    let mut children = member.children(&mut cursor);
    children.find(|child| child.kind() == "=")?;
    children.find(|child| child.is_named() && child.kind() != COMMENT)
}

/// Comments directly before `member` that belong to it.
///
/// A comment starting on the line where the previous token ends is that
/// token's trailing trivia (`Red, // red`), not the next member's.
fn leading_comments<'s>(member: Node<'_>, source: &'s str) -> Vec<CommentTrivia<'s>> {
    let mut comments = Vec::new();
    let mut previous_token_row = None;

    let mut sibling = member.prev_sibling();
    while let Some(node) = sibling {
        if node.kind() == COMMENT {
            comments.push(node);
        } else if !PREPROC_TRIVIA.contains(&node.kind()) {
            previous_token_row = Some(last_row(node));
            break;
        }
        sibling = node.prev_sibling();
    }
    comments.reverse();

    comments
        .into_iter()
        .filter(|comment| previous_token_row.map_or(true, |row| comment.start_position().row > row))
        .map(|comment| CommentTrivia {
            text: node_text(comment, source),
            start_row: comment.start_position().row,
            end_row: comment.end_position().row,
        })
        .collect()
}

/// Row of the last character of `node`. Nodes that swallow their line break
/// end at column 0 of the following row.
fn last_row(node: Node<'_>) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row - 1
    } else {
        end.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{discover_enums, CSharpParser, SourceTree};
    use std::path::Path;

    fn parse(code: &str) -> SourceTree {
        CSharpParser::new()
            .parse_source(Path::new("Test.cs"), code.to_string())
            .unwrap()
    }

    fn members_of(code: &str) -> Vec<Vec<MemberRecord>> {
        let tree = parse(code);
        discover_enums(&tree)
            .iter()
            .map(|m| extract_members(m.node, &tree.source).members)
            .collect()
    }

    fn member_list_of(code: &str) -> MemberList {
        let tree = parse(code);
        let found = discover_enums(&tree).remove(0);
        extract_members(found.node, &tree.source)
    }

    #[test]
    fn test_color_example() {
        let code = r#"using System;

enum Color {
    Red,
    Green = 5,
    /// <summary>blue comment</summary>
    Blue
}
"#;
        let members = members_of(code);
        assert_eq!(
            members,
            vec![vec![
                MemberRecord::new("Red", "", ""),
                MemberRecord::new("Green", "5", ""),
                MemberRecord::new("Blue", "", "blue comment"),
            ]]
        );
    }

    #[test]
    fn test_initializers_are_not_evaluated() {
        let code = r#"[System.Flags]
enum Access
{
    None = 0,
    Read = 1 << 0,
    Write = 1 << 1,
    ReadWrite = Read | Write,
    Hex = 0xFF,
    Cast = (int)Other.Value,
}
"#;
        let values: Vec<_> = members_of(code)[0]
            .iter()
            .map(|m| m.value_text.clone())
            .collect();
        assert_eq!(
            values,
            vec!["0", "1 << 0", "1 << 1", "Read | Write", "0xFF", "(int)Other.Value"]
        );
    }

    #[test]
    fn test_enum_doc_does_not_leak_to_first_member() {
        let code = r#"/// <summary>The enum itself</summary>
enum State
{
    Idle,
    Busy,
}
"#;
        let members = members_of(code).remove(0);
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.comment_text.is_empty()));
    }

    #[test]
    fn test_sibling_comment_does_not_leak() {
        let code = r#"enum Level
{
    /// <summary>Lowest level</summary>
    Low = 1,
    Mid = 2,
    /// <summary>
    /// Highest level
    /// </summary>
    High = 3
}
"#;
        let comments: Vec<_> = members_of(code)[0]
            .iter()
            .map(|m| m.comment_text.clone())
            .collect();
        assert_eq!(comments, vec!["Lowest level", "", "Highest level"]);
    }

    #[test]
    fn test_trailing_comment_belongs_to_previous_member() {
        let code = r#"enum Side
{
    Left, /// <summary>trailing</summary>
    Right
}
"#;
        let comments: Vec<_> = members_of(code)[0]
            .iter()
            .map(|m| m.comment_text.clone())
            .collect();
        assert_eq!(comments, vec!["", ""]);
    }

    #[test]
    fn test_doc_before_attributed_member() {
        let code = r#"enum Legacy
{
    /// <summary>Do not use</summary>
    [System.Obsolete]
    Old = 1,
    New = 2,
}
"#;
        let members = members_of(code).remove(0);
        assert_eq!(members[0], MemberRecord::new("Old", "1", "Do not use"));
        assert_eq!(members[1], MemberRecord::new("New", "2", ""));
    }

    #[test]
    fn test_plain_comment_before_doc_block() {
        let code = r#"enum Mode
{
    // section header
    /// <summary>documented</summary>
    Fast,
}
"#;
        assert_eq!(members_of(code)[0][0].comment_text, "documented");
    }

    #[test]
    fn test_empty_enum() {
        assert_eq!(members_of("enum Nothing { }"), vec![Vec::<MemberRecord>::new()]);
    }

    #[test]
    fn test_nested_enums_keep_their_own_members() {
        let code = r#"class Outer
{
    enum A { X = 1, Y }
    class Inner
    {
        enum B { Z = 3 }
    }
}
"#;
        let members = members_of(code);
        assert_eq!(members.len(), 2);
        assert_eq!(
            members[0],
            vec![MemberRecord::new("X", "1", ""), MemberRecord::new("Y", "", "")]
        );
        assert_eq!(members[1], vec![MemberRecord::new("Z", "3", "")]);
    }

    #[test]
    fn test_region_directives_keep_member_docs() {
        let code = r#"enum Shade
{
    #region Basics
    /// <summary>a doc</summary>
    A,
    #endregion
    /// <summary>b doc</summary>
    B = 2,
}
"#;
        let members = members_of(code).remove(0);
        assert_eq!(
            members,
            vec![
                MemberRecord::new("A", "", "a doc"),
                MemberRecord::new("B", "2", "b doc"),
            ]
        );
    }

    #[test]
    fn test_pragma_between_doc_and_member() {
        let code = r#"enum Legacy
{
    /// <summary>kept</summary>
#pragma warning disable CS0618
    Old = 1,
}
"#;
        assert_eq!(members_of(code)[0][0].comment_text, "kept");
    }

    #[test]
    fn test_conditional_members_are_included() {
        let code = r#"enum Build
{
    Always,
#if DEBUG
    Debug = 9
#else
    Release = 10
#endif
}
"#;
        let list = member_list_of(code);
        let names: Vec<_> = list.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Always", "Debug", "Release"]);
        assert_eq!(list.members[1].value_text, "9");
    }

    #[test]
    fn test_unparsable_body_is_flagged() {
        let code = "enum E {\n    A,\n#if DEBUG\n    Dbg = 9,\n#endif\n    B,\n}\n";
        let list = member_list_of(code);
        assert!(list.has_errors);
        assert_eq!(list.members[0].name, "A");
    }

    #[test]
    fn test_clean_body_has_no_errors() {
        let list = member_list_of("enum Color { Red, Green = 5 }");
        assert!(!list.has_errors);
        assert_eq!(list.members.len(), 2);
    }
}
