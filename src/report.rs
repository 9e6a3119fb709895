//! Rendering of the sorted inventory.

use crate::parser::{EnumRecord, MemberRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

const HEADERS: [&str; 3] = ["Name", "Value", "Comment"];

/// One titled table per record, columns Name / Value / Comment.
pub fn render_tables(records: &[EnumRecord]) -> String {
    let mut lines = Vec::new();
    for record in records {
        lines.push(record.title());
        render_table(&mut lines, &record.values);
        lines.push(String::new());
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_table(lines: &mut Vec<String>, members: &[MemberRecord]) {
    let rows: Vec<[Vec<&str>; 3]> = members
        .iter()
        .map(|m| {
            [
                cell_lines(&m.name),
                cell_lines(&m.value_text),
                cell_lines(&m.comment_text),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            let longest = cell.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            *width = (*width).max(longest);
        }
    }

    let separator = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    lines.push(separator.clone());
    lines.push(format_row(&HEADERS, &widths));
    lines.push(separator.clone());
    for row in &rows {
        let height = row.iter().map(Vec::len).max().unwrap_or(1);
        for i in 0..height {
            let cells = [0, 1, 2].map(|c| row[c].get(i).copied().unwrap_or(""));
            lines.push(format_row(&cells, &widths));
        }
    }
    lines.push(separator);
}

/// Multi-line summaries are spread over several physical rows.
fn cell_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        vec![""]
    } else {
        text.lines().collect()
    }
}

fn format_row(cells: &[&str; 3], widths: &[usize; 3]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
        .collect();
    format!("|{}|", padded.join("|"))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    generated_at: DateTime<Utc>,
    enum_count: usize,
    enums: &'a [EnumRecord],
}

/// Pretty-printed JSON document holding every record.
pub fn render_json(source: &str, records: &[EnumRecord]) -> serde_json::Result<String> {
    let report = JsonReport {
        source,
        generated_at: Utc::now(),
        enum_count: records.len(),
        enums: records,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> EnumRecord {
        EnumRecord {
            name: "Color".to_string(),
            project_name: "Demo".to_string(),
            relative_file_path: "Colors.cs".to_string(),
            line_number: 2,
            values: vec![
                MemberRecord::new("Red", "", ""),
                MemberRecord::new("Green", "5", ""),
                MemberRecord::new("Blue", "", "blue comment"),
            ],
        }
    }

    #[test]
    fn test_render_table() {
        let expected = "\
Color - Demo - Colors.cs:2
+-------+-------+--------------+
| Name  | Value | Comment      |
+-------+-------+--------------+
| Red   |       |              |
| Green | 5     |              |
| Blue  |       | blue comment |
+-------+-------+--------------+

";
        assert_eq!(render_tables(&[color()]), expected);
    }

    #[test]
    fn test_multi_line_comment_spans_rows() {
        let record = EnumRecord {
            values: vec![MemberRecord::new("A", "1", "first\nsecond")],
            ..color()
        };
        let out = render_tables(&[record]);
        assert!(out.contains("| A    | 1     | first   |\n|      |       | second  |"));
    }

    #[test]
    fn test_enum_without_members() {
        let record = EnumRecord {
            values: vec![],
            ..color()
        };
        let out = render_tables(&[record]);
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn test_no_records_renders_nothing() {
        assert_eq!(render_tables(&[]), "");
    }

    #[test]
    fn test_render_json() {
        let json = render_json("Demo.csproj", &[color()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source"], "Demo.csproj");
        assert_eq!(value["enum_count"], 1);
        assert_eq!(value["enums"][0]["name"], "Color");
        assert_eq!(value["enums"][0]["line_number"], 2);
        assert_eq!(value["enums"][0]["values"][1]["value_text"], "5");
        assert_eq!(value["enums"][0]["values"][2]["comment_text"], "blue comment");
        assert!(value["generated_at"].is_string());
    }
}
