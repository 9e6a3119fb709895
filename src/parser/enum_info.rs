use serde::Serialize;

/// Represents an enum member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    /// Member name (e.g., "Green")
    pub name: String,
    /// Initializer exactly as written (`"1 << 2"` stays unevaluated), empty if none
    pub value_text: String,
    /// Text of the member's own `<summary>` doc element, empty if none
    pub comment_text: String,
}

impl MemberRecord {
    pub fn new(
        name: impl Into<String>,
        value_text: impl Into<String>,
        comment_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value_text: value_text.into(),
            comment_text: comment_text.into(),
        }
    }
}

/// Represents one enum declaration found in a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumRecord {
    /// Enum name, not unique across the inventory
    pub name: String,
    /// Display name of the owning project
    pub project_name: String,
    /// Declaring file, relative to the project directory, `/`-separated
    pub relative_file_path: String,
    /// Zero-based line of the declaration (attributes included, doc comments not)
    pub line_number: usize,
    /// Members in declaration order
    pub values: Vec<MemberRecord>,
}

impl EnumRecord {
    /// `{name} - {project} - {path}:{line}`
    pub fn title(&self) -> String {
        format!(
            "{} - {} - {}:{}",
            self.name, self.project_name, self.relative_file_path, self.line_number
        )
    }
}
