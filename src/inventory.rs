//! Aggregation of enum records: document → project → solution.
//!
//! A document that cannot be parsed drops only its own records. Its error is
//! kept beside the records so the caller can report it. An enum body that
//! parsed only partly keeps the members that were recovered and adds a
//! warning. Projects run in
//! parallel on the rayon pool and share nothing until the final flatten.

use crate::error::{ScanError, ScanResult};
use crate::parser::{discover_enums, extract_members, EnumRecord, TreeAcquirer};
use crate::scanner::DocumentFilter;
use crate::workspace::{Project, Solution, Workspace};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Records and failures of one project.
#[derive(Debug, Default)]
pub struct ProjectInventory {
    pub project_name: String,
    pub document_count: usize,
    pub records: Vec<EnumRecord>,
    pub failures: Vec<ScanError>,
    pub warnings: Vec<ScanError>,
}

/// The combined, sorted result of a run.
#[derive(Debug, Default)]
pub struct Inventory {
    pub project_count: usize,
    pub document_count: usize,
    pub records: Vec<EnumRecord>,
    pub failures: Vec<ScanError>,
    pub warnings: Vec<ScanError>,
}

impl Inventory {
    fn from_projects(projects: Vec<ProjectInventory>) -> Self {
        let mut inventory = Inventory {
            project_count: projects.len(),
            ..Default::default()
        };
        for project in projects {
            inventory.document_count += project.document_count;
            inventory.records.extend(project.records);
            inventory.failures.extend(project.failures);
            inventory.warnings.extend(project.warnings);
        }
        inventory.records = sort_records(inventory.records);
        inventory
    }
}

/// Records of one document, plus problems that did not stop it.
#[derive(Debug, Default)]
pub struct DocumentRecords {
    pub records: Vec<EnumRecord>,
    pub warnings: Vec<ScanError>,
}

/// Enum records of a single document, stamped with `project`.
pub fn process_document<A>(acquirer: &A, project: &Project, document: &Path) -> ScanResult<DocumentRecords>
where
    A: TreeAcquirer + ?Sized,
{
    let tree = acquirer.acquire(document)?;
    let relative_file_path = project.relative_path(&tree.path);

    let mut output = DocumentRecords::default();
    for found in discover_enums(&tree) {
        let list = extract_members(found.node, &tree.source);
        if list.has_errors {
            output.warnings.push(ScanError::syntax(
                &tree.path,
                found.line_number,
                format!("enum {}: unparsable enum body, members may be missing", found.name),
            ));
        }
        output.records.push(EnumRecord {
            name: found.name.to_string(),
            project_name: project.name.clone(),
            relative_file_path: relative_file_path.clone(),
            line_number: found.line_number,
            values: list.members,
        });
    }

    debug!(
        document = %relative_file_path,
        enums = output.records.len(),
        warnings = output.warnings.len(),
        "processed document"
    );
    Ok(output)
}

/// Run every document of `project` in order and concatenate the results.
pub fn aggregate_project<A>(acquirer: &A, project: &Project) -> ProjectInventory
where
    A: TreeAcquirer + ?Sized,
{
    let mut inventory = ProjectInventory {
        project_name: project.name.clone(),
        document_count: project.documents.len(),
        ..Default::default()
    };

    for document in &project.documents {
        match process_document(acquirer, project, document) {
            Ok(output) => {
                for warning in &output.warnings {
                    warn!(project = %project.name, warning = %warning, "incomplete enum");
                }
                inventory.records.extend(output.records);
                inventory.warnings.extend(output.warnings);
            }
            Err(e) => {
                warn!(project = %project.name, error = %e, "skipping document");
                inventory.failures.push(e);
            }
        }
    }

    info!(
        project = %project.name,
        documents = inventory.document_count,
        enums = inventory.records.len(),
        failures = inventory.failures.len(),
        warnings = inventory.warnings.len(),
        "scanned project"
    );
    inventory
}

/// Load and aggregate every project of `solution` concurrently.
///
/// A project whose descriptor cannot be loaded contributes its load error
/// and no records. The other projects are unaffected.
pub fn aggregate_solution<A>(acquirer: &A, solution: &Solution, filter: &DocumentFilter) -> Inventory
where
    A: TreeAcquirer + ?Sized,
{
    let projects: Vec<ProjectInventory> = solution
        .project_paths
        .par_iter()
        .map(|path| match Project::load(path, filter) {
            Ok(project) => aggregate_project(acquirer, &project),
            Err(e) => {
                warn!(solution = %solution.name, error = %e, "skipping project");
                ProjectInventory {
                    project_name: path.display().to_string(),
                    failures: vec![e],
                    ..Default::default()
                }
            }
        })
        .collect();

    Inventory::from_projects(projects)
}

/// Scan a whole workspace into a sorted inventory.
pub fn scan_workspace<A>(acquirer: &A, workspace: &Workspace, filter: &DocumentFilter) -> Inventory
where
    A: TreeAcquirer + ?Sized,
{
    let inventory = match workspace {
        Workspace::Solution(solution) => aggregate_solution(acquirer, solution, filter),
        Workspace::Project(project) => Inventory::from_projects(vec![aggregate_project(acquirer, project)]),
    };

    info!(
        workspace = %workspace.name(),
        projects = inventory.project_count,
        enums = inventory.records.len(),
        failures = inventory.failures.len(),
        warnings = inventory.warnings.len(),
        "scan complete"
    );
    inventory
}

/// Stable sort by enum name, compared ordinally.
pub fn sort_records(mut records: Vec<EnumRecord>) -> Vec<EnumRecord> {
    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}
