//! XML documentation comments.
//!
//! A member's leading trivia may hold several comments. Consecutive `///`
//! lines form one documentation block and each `/** */` comment forms its
//! own. Only the first block is consulted, and only its top-level
//! `<summary>` element.

use quick_xml::events::Event;
use quick_xml::Reader;

const SUMMARY_TAG: &[u8] = b"summary";

/// A comment as it appears in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentTrivia<'s> {
    pub text: &'s str,
    pub start_row: usize,
    pub end_row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentKind {
    SingleLineDoc,
    MultiLineDoc,
    Regular,
}

fn classify(text: &str) -> CommentKind {
    if text.starts_with("///") && !text.starts_with("////") {
        CommentKind::SingleLineDoc
    } else if text.starts_with("/**") && !text.starts_with("/**/") && !text.starts_with("/***") {
        CommentKind::MultiLineDoc
    } else {
        CommentKind::Regular
    }
}

/// Delimiter-free XML of the first documentation block in `trivia`.
pub fn first_doc_block(trivia: &[CommentTrivia<'_>]) -> Option<String> {
    let mut iter = trivia.iter().peekable();

    while let Some(comment) = iter.next() {
        match classify(comment.text) {
            CommentKind::Regular => continue,
            CommentKind::MultiLineDoc => return Some(strip_multi_line(comment.text)),
            CommentKind::SingleLineDoc => {
                let mut lines = vec![strip_single_line(comment.text)];
                let mut last_row = comment.end_row;
                while let Some(next) = iter.peek() {
                    if classify(next.text) != CommentKind::SingleLineDoc
                        || next.start_row != last_row + 1
                    {
                        break;
                    }
                    lines.push(strip_single_line(next.text));
                    last_row = next.end_row;
                    iter.next();
                }
                return Some(lines.join("\n"));
            }
        }
    }
    None
}

fn strip_single_line(text: &str) -> &str {
    text.strip_prefix("///").unwrap_or(text).trim_end_matches('\r')
}

fn strip_multi_line(text: &str) -> String {
    let body = text.strip_prefix("/**").unwrap_or(text);
    let body = body.strip_suffix("*/").unwrap_or(body);
    body.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            trimmed.strip_prefix('*').unwrap_or(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inner text of the first top-level `<summary>` element, or `None` when the
/// block has none or is malformed before the element closes.
pub fn summary_text(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut depth = 0usize;
    let mut summary_start: Option<usize> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().ok()?;
        match event {
            Event::Start(start) => {
                if depth == 0 && start.name().as_ref() == SUMMARY_TAG {
                    summary_start = Some(reader.buffer_position() as usize);
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(start) = summary_start {
                        return xml.get(start..before).map(normalize);
                    }
                }
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Removes the indentation shared by the continuation lines, then trims the
/// whole text. Deeper indentation inside the summary survives.
fn normalize(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim_end).collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| match i {
            0 => *line,
            _ => line.get(indent..).unwrap_or_else(|| line.trim_start()),
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Summary of the member's own documentation, empty when there is none.
pub fn member_summary(trivia: &[CommentTrivia<'_>]) -> String {
    first_doc_block(trivia)
        .and_then(|xml| summary_text(&xml))
        .unwrap_or_default()
}
