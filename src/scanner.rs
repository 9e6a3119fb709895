use crate::error::{ScanError, ScanResult};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffixes of files produced by designers and source generators.
const GENERATED_SUFFIXES: &[&str] = &[
    ".g.cs",
    ".g.i.cs",
    ".designer.cs",
    ".generated.cs",
    ".assemblyattributes.cs",
];

/// Whether `path` names a C# source file, excluding scripts and markup.
pub fn is_csharp_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cs"))
}

/// Whether `path` looks tool-generated rather than hand-written.
pub fn is_generated(path: &Path) -> bool {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if GENERATED_SUFFIXES.iter().any(|s| file_name.ends_with(s)) {
        return true;
    }
    if file_name.starts_with("temporarygeneratedfile_") {
        return true;
    }
    // obj/**/Project.AssemblyInfo.cs
    file_name.ends_with(".assemblyinfo.cs") && path.components().any(|c| c.as_os_str() == "obj")
}

/// Decides which documents of a project take part in the scan.
#[derive(Debug, Default, Clone)]
pub struct DocumentFilter {
    exclude: Vec<Pattern>,
    include_generated: bool,
}

impl DocumentFilter {
    pub fn new(exclude: &[String], include_generated: bool) -> Result<Self, glob::PatternError> {
        let exclude = exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            exclude,
            include_generated,
        })
    }

    /// `relative` is the document path relative to its project directory.
    pub fn accepts(&self, path: &Path, relative: &Path) -> bool {
        if !is_csharp_source(path) {
            return false;
        }
        if !self.include_generated && is_generated(path) {
            return false;
        }
        let relative = relative.to_string_lossy().replace('\\', "/");
        !self.exclude.iter().any(|p| p.matches(&relative))
    }
}

/// Every `.cs` file under `dir`, skipping `bin/`, `obj/` and hidden
/// directories at any depth.
pub fn scan_directory(dir: &Path) -> ScanResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir).sort_by_file_name().into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !(name.starts_with('.')
            || name.eq_ignore_ascii_case("bin")
            || name.eq_ignore_ascii_case("obj"))
    });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ScanError::project(path, e.to_string())
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && is_csharp_source(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Expand a glob pattern into the files it matches, in path order.
pub fn expand_glob(pattern: &str) -> ScanResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| ScanError::project(PathBuf::from(pattern), e.to_string()))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| ScanError::project(e.path().to_path_buf(), e.to_string()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
