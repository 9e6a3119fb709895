//! Solution and project descriptors.
//!
//! `.sln` files are read line by line for their project entries. `.csproj`
//! files are read with quick-xml for the settings that decide which documents
//! are compiled.

use crate::error::{IoResultExt, ScanError, ScanResult};
use crate::scanner::{self, DocumentFilter};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// A named set of source documents sharing a base directory.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub documents: Vec<PathBuf>,
}

/// A named set of projects. Projects are loaded lazily so that one broken
/// project file does not prevent the others from being scanned.
#[derive(Debug, Clone)]
pub struct Solution {
    pub name: String,
    pub path: PathBuf,
    pub project_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum Workspace {
    Solution(Solution),
    Project(Project),
}

impl Workspace {
    /// Open a `.sln` or `.csproj` file, or a directory holding exactly one of
    /// them (solutions win).
    pub fn open(path: &Path, filter: &DocumentFilter) -> ScanResult<Self> {
        let path = std::fs::canonicalize(path).with_path(path)?;
        let descriptor = if path.is_dir() {
            find_descriptor(&path)?
        } else {
            path
        };

        match extension_lowercase(&descriptor).as_deref() {
            Some("sln") => Ok(Self::Solution(Solution::load(&descriptor)?)),
            Some("csproj") => Ok(Self::Project(Project::load(&descriptor, filter)?)),
            _ => Err(ScanError::project(
                descriptor,
                "expected a .sln or .csproj file",
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Solution(solution) => &solution.name,
            Self::Project(project) => &project.name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Solution(solution) => &solution.path,
            Self::Project(project) => &project.path,
        }
    }

    /// Directories whose contents feed this workspace.
    pub fn source_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = match self {
            Self::Project(project) => vec![project.base_dir.clone()],
            Self::Solution(solution) => {
                let mut roots = vec![parent_dir(&solution.path)];
                roots.extend(solution.project_paths.iter().map(|p| parent_dir(p)));
                roots
            }
        };
        roots.sort();
        roots.dedup();
        roots
    }
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn find_descriptor(dir: &Path) -> ScanResult<PathBuf> {
    let mut solutions = Vec::new();
    let mut projects = Vec::new();
    for entry in std::fs::read_dir(dir).with_path(dir)? {
        let path = entry.with_path(dir)?.path();
        if !path.is_file() {
            continue;
        }
        match extension_lowercase(&path).as_deref() {
            Some("sln") => solutions.push(path),
            Some("csproj") => projects.push(path),
            _ => {}
        }
    }

    let mut candidates = if solutions.is_empty() { projects } else { solutions };
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(ScanError::project(dir, "no .sln or .csproj file found")),
        n => Err(ScanError::project(
            dir,
            format!("{n} candidate descriptors found, pass one explicitly"),
        )),
    }
}

fn solution_project_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*Project\("\{[0-9A-Fa-f-]+\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{[0-9A-Fa-f-]+\}""#)
            .expect("solution project pattern is valid")
    })
}

impl Solution {
    pub fn load(path: &Path) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        Ok(Self::parse(path, &content))
    }

    /// Project entries of a solution file. Solution folders and non-C#
    /// projects are skipped.
    pub fn parse(path: &Path, content: &str) -> Self {
        let base = parent_dir(path);
        let project_paths = content
            .lines()
            .filter_map(|line| solution_project_regex().captures(line))
            .filter_map(|caps| {
                let relative = caps.get(2)?.as_str().replace('\\', "/");
                relative
                    .to_ascii_lowercase()
                    .ends_with(".csproj")
                    .then(|| base.join(relative))
            })
            .collect();

        Self {
            name: file_stem(path),
            path: path.to_path_buf(),
            project_paths,
        }
    }
}

/// Compile-related settings read from a project file.
#[derive(Debug, Default, PartialEq, Eq)]
struct ProjectFile {
    sdk_style: bool,
    default_compile_items: bool,
    includes: Vec<String>,
    removes: Vec<String>,
}

impl ProjectFile {
    fn parse(path: &Path, content: &str) -> ScanResult<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut file = ProjectFile {
            default_compile_items: true,
            ..Default::default()
        };
        let mut saw_root = false;
        let mut in_default_items_flag = false;

        loop {
            match reader.read_event().map_err(|e| xml_error(path, e))? {
                Event::Start(e) | Event::Empty(e) if !saw_root => {
                    if e.name().as_ref() != b"Project" {
                        return Err(ScanError::project(path, "root element is not <Project>"));
                    }
                    saw_root = true;
                    file.sdk_style = attribute(&e, "Sdk").map_err(|e| xml_error(path, e))?.is_some();
                }
                Event::Start(e) if e.name().as_ref() == b"EnableDefaultCompileItems" => {
                    in_default_items_flag = true;
                }
                Event::Text(text) if in_default_items_flag => {
                    let value = text.unescape().map_err(|e| xml_error(path, e))?;
                    file.default_compile_items = !value.trim().eq_ignore_ascii_case("false");
                }
                Event::End(e) if e.name().as_ref() == b"EnableDefaultCompileItems" => {
                    in_default_items_flag = false;
                }
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"Sdk" => file.sdk_style = true,
                    b"Import" => {
                        if attribute(&e, "Sdk").map_err(|e| xml_error(path, e))?.is_some() {
                            file.sdk_style = true;
                        }
                    }
                    b"Compile" => {
                        if let Some(include) = attribute(&e, "Include").map_err(|e| xml_error(path, e))? {
                            file.includes.extend(split_items(&include));
                        }
                        if let Some(remove) = attribute(&e, "Remove").map_err(|e| xml_error(path, e))? {
                            file.removes.extend(split_items(&remove));
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(ScanError::project(path, "missing <Project> root element"));
        }
        Ok(file)
    }
}

fn xml_error(path: &Path, e: impl std::fmt::Display) -> ScanError {
    ScanError::project(path, e.to_string())
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, quick_xml::Error> {
    match element.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// `a.cs;b\c.cs` items; MSBuild property references are not evaluated and
/// such items are dropped.
fn split_items(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(|item| item.trim().replace('\\', "/"))
        .filter(|item| !item.is_empty() && !item.contains("$(") && !item.contains("@("))
        .collect()
}

fn is_glob(item: &str) -> bool {
    item.contains(['*', '?', '['])
}

impl Project {
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>, documents: Vec<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            name: name.into(),
            path: base_dir.clone(),
            base_dir,
            documents,
        }
    }

    /// Load a `.csproj` and resolve its compiled documents.
    pub fn load(path: &Path, filter: &DocumentFilter) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let file = ProjectFile::parse(path, &content)?;
        let base_dir = parent_dir(path);

        let mut documents = BTreeSet::new();
        if file.sdk_style && file.default_compile_items {
            documents.extend(scanner::scan_directory(&base_dir)?);
        }
        for include in &file.includes {
            if is_glob(include) {
                let pattern = base_dir.join(include);
                documents.extend(scanner::expand_glob(&pattern.to_string_lossy())?);
            } else {
                documents.insert(base_dir.join(include));
            }
        }

        let removes = file
            .removes
            .iter()
            .filter_map(|r| glob::Pattern::new(r).ok())
            .collect::<Vec<_>>();

        let documents: Vec<PathBuf> = documents
            .into_iter()
            .filter(|doc| {
                let relative = relative_path(doc, &base_dir);
                if removes.iter().any(|p| p.matches(&relative)) {
                    return false;
                }
                filter.accepts(doc, Path::new(&relative))
            })
            .collect();

        debug!(
            project = %path.display(),
            sdk_style = file.sdk_style,
            documents = documents.len(),
            "loaded project"
        );

        Ok(Self {
            name: file_stem(path),
            path: path.to_path_buf(),
            base_dir,
            documents,
        })
    }

    /// `document` relative to this project's directory.
    pub fn relative_path(&self, document: &Path) -> String {
        relative_path(document, &self.base_dir)
    }
}

/// `/`-separated path of `path` relative to `base`. Falls back to `path`
/// itself when no relative form exists.
pub fn relative_path(path: &Path, base: &Path) -> String {
    let relative = pathdiff::diff_paths(path, base)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf());
    relative.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SLN: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio Version 17
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Core", "src\Core\Core.csproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Solution Items", "Solution Items", "{22222222-2222-2222-2222-222222222222}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Legacy", "Legacy\Legacy.csproj", "{33333333-3333-3333-3333-333333333333}"
EndProject
Project("{F184B08F-C81C-45F6-A57F-5ABD9991F28F}") = "VbLib", "VbLib\VbLib.vbproj", "{44444444-4444-4444-4444-444444444444}"
EndProject
"#;

    #[test]
    fn test_parse_solution() {
        let solution = Solution::parse(Path::new("/repo/App.sln"), SLN);
        assert_eq!(solution.name, "App");
        assert_eq!(
            solution.project_paths,
            vec![
                PathBuf::from("/repo/src/Core/Core.csproj"),
                PathBuf::from("/repo/Legacy/Legacy.csproj"),
            ]
        );
    }

    #[test]
    fn test_parse_sdk_project_file() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <Compile Remove="Experimental\**" />
    <Compile Include="..\Shared\Common.cs;$(Generated)\X.cs" />
  </ItemGroup>
</Project>"#;
        let file = ProjectFile::parse(Path::new("App.csproj"), xml).unwrap();
        assert_eq!(
            file,
            ProjectFile {
                sdk_style: true,
                default_compile_items: true,
                includes: vec!["../Shared/Common.cs".to_string()],
                removes: vec!["Experimental/**".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_project_disabling_default_items() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <EnableDefaultCompileItems>false</EnableDefaultCompileItems>
  </PropertyGroup>
</Project>"#;
        let file = ProjectFile::parse(Path::new("App.csproj"), xml).unwrap();
        assert!(file.sdk_style);
        assert!(!file.default_compile_items);
    }

    #[test]
    fn test_parse_rejects_non_project_root() {
        let err = ProjectFile::parse(Path::new("x.csproj"), "<Solution/>").unwrap_err();
        assert!(matches!(err, ScanError::Project { .. }));

        let err = ProjectFile::parse(Path::new("x.csproj"), "").unwrap_err();
        assert!(matches!(err, ScanError::Project { .. }));
    }

    #[test]
    fn test_load_sdk_project() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("Demo.csproj"),
            r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><Compile Remove="Old/**" /></ItemGroup></Project>"#,
        )
        .unwrap();
        fs::write(root.join("Colors.cs"), "").unwrap();
        fs::create_dir_all(root.join("Models")).unwrap();
        fs::write(root.join("Models").join("Shape.cs"), "").unwrap();
        fs::write(root.join("Models").join("Shape.Designer.cs"), "").unwrap();
        fs::create_dir_all(root.join("Old")).unwrap();
        fs::write(root.join("Old").join("Gone.cs"), "").unwrap();
        fs::create_dir_all(root.join("obj")).unwrap();
        fs::write(root.join("obj").join("Temp.cs"), "").unwrap();

        let project = Project::load(&root.join("Demo.csproj"), &DocumentFilter::default()).unwrap();
        assert_eq!(project.name, "Demo");
        assert_eq!(project.base_dir, root);
        let relative: Vec<_> = project
            .documents
            .iter()
            .map(|d| project.relative_path(d))
            .collect();
        assert_eq!(relative, vec!["Colors.cs", "Models/Shape.cs"]);
    }

    #[test]
    fn test_load_legacy_project_uses_explicit_items() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("Legacy.csproj"),
            r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup>
    <Compile Include="Program.cs" />
    <Compile Include="Enums\*.cs" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();
        fs::write(root.join("Program.cs"), "").unwrap();
        fs::write(root.join("Unlisted.cs"), "").unwrap();
        fs::create_dir_all(root.join("Enums")).unwrap();
        fs::write(root.join("Enums").join("Kind.cs"), "").unwrap();

        let project = Project::load(&root.join("Legacy.csproj"), &DocumentFilter::default()).unwrap();
        let relative: Vec<_> = project
            .documents
            .iter()
            .map(|d| project.relative_path(d))
            .collect();
        assert_eq!(relative, vec!["Enums/Kind.cs", "Program.cs"]);
    }

    #[test]
    fn test_open_directory_prefers_solution() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("App.sln"), SLN).unwrap();
        fs::write(dir.path().join("App.csproj"), "<Project Sdk=\"x\"/>").unwrap();

        let workspace = Workspace::open(dir.path(), &DocumentFilter::default()).unwrap();
        assert!(matches!(workspace, Workspace::Solution(_)));
        assert_eq!(workspace.name(), "App");
    }

    #[test]
    fn test_open_rejects_other_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "").unwrap();
        assert!(Workspace::open(&path, &DocumentFilter::default()).is_err());
    }

    #[test]
    fn test_relative_path_fallback() {
        assert_eq!(relative_path(Path::new("/a/b/C.cs"), Path::new("/a")), "b/C.cs");
        assert_eq!(relative_path(Path::new("/a/../C.cs"), Path::new("rel")), "/a/../C.cs");
    }
}
