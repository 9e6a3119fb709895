use anyhow::{Context, Result};
use clap::Parser;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use enum_inventory::config::{Config, OutputFormat};
use enum_inventory::inventory::{scan_workspace, Inventory};
use enum_inventory::logging::init_logging;
use enum_inventory::parser::CSharpParser;
use enum_inventory::report::{render_json, render_tables};
use enum_inventory::scanner::DocumentFilter;
use enum_inventory::workspace::Workspace;

#[derive(Parser)]
#[command(name = "enum-inventory")]
#[command(about = "Lists every C# enum in a solution or project, with member values and doc summaries")]
#[command(version)]
struct Cli {
    /// Solution (.sln) or project (.csproj) file, or a directory holding one
    path: PathBuf,

    /// Configuration file (defaults to enum-inventory.toml next to PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format, overrides the config file
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Include designer and other generated files
    #[arg(long)]
    include_generated: bool,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Watch mode: rescan whenever sources or project files change
    #[arg(short, long)]
    watch: bool,
}

/// Settings after merging the config file with CLI overrides.
struct Settings {
    format: OutputFormat,
    filter: DocumentFilter,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let config_dir = if cli.path.is_dir() {
            cli.path.clone()
        } else {
            cli.path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        };
        let config = Config::resolve(cli.config.as_deref(), &config_dir)
            .context("Failed to load configuration")?;

        let filter = DocumentFilter::new(
            &config.scan.exclude,
            cli.include_generated || config.scan.include_generated,
        )
        .context("Invalid pattern in scan.exclude")?;

        Ok(Self {
            format: cli.format.unwrap_or(config.output.format),
            filter,
        })
    }
}

/// Run the scan once and print the report
fn run_scan(cli: &Cli, settings: &Settings) -> Result<Workspace> {
    let start = Instant::now();

    let workspace = Workspace::open(&cli.path, &settings.filter)
        .with_context(|| format!("Failed to open {:?}", cli.path))?;

    let inventory = scan_workspace(&CSharpParser::new(), &workspace, &settings.filter);

    match settings.format {
        OutputFormat::Table => print!("{}", render_tables(&inventory.records)),
        OutputFormat::Json => {
            let source = workspace.path().display().to_string();
            print!("{}", render_json(&source, &inventory.records)?);
        }
    }

    print_summary(&inventory, start.elapsed());
    Ok(workspace)
}

fn print_summary(inventory: &Inventory, elapsed: Duration) {
    eprintln!(
        "Scanned {} project(s), {} document(s): {} enum(s), {} failure(s), {} warning(s) in {:?}",
        inventory.project_count,
        inventory.document_count,
        inventory.records.len(),
        inventory.failures.len(),
        inventory.warnings.len(),
        elapsed
    );
    for failure in &inventory.failures {
        eprintln!("  Failed: {}", failure);
    }
    for warning in &inventory.warnings {
        eprintln!("  Warning: {}", warning);
    }
}

/// Existing source roots of `workspace`.
fn watch_roots(workspace: &Workspace) -> Vec<PathBuf> {
    let mut roots = workspace.source_roots();
    roots.retain(|p| p.exists());
    roots
}

/// Roots to stop watching and roots to start watching.
fn root_changes<'a>(watched: &'a [PathBuf], roots: &'a [PathBuf]) -> (Vec<&'a PathBuf>, Vec<&'a PathBuf>) {
    let removed = watched.iter().filter(|p| !roots.contains(*p)).collect();
    let added = roots.iter().filter(|p| !watched.contains(*p)).collect();
    (removed, added)
}

/// Watch the roots of a freshly loaded workspace and drop roots it no
/// longer has, so projects added to a solution are picked up.
fn sync_watches(watcher: &mut RecommendedWatcher, watched: &mut Vec<PathBuf>, roots: Vec<PathBuf>) -> Result<()> {
    let (removed, added) = root_changes(watched, &roots);
    for old in removed {
        if let Err(e) = watcher.unwatch(old) {
            eprintln!("Failed to stop watching {}: {}", old.display(), e);
        }
    }
    for root in added {
        watcher.watch(root, RecursiveMode::Recursive)?;
        eprintln!("  Watching {}", root.display());
    }
    *watched = roots;
    Ok(())
}

fn is_watched_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "cs" || ext == "csproj" || ext == "sln"
        })
        .unwrap_or(false)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let settings = Settings::resolve(&cli)?;

    let workspace = run_scan(&cli, &settings)?;
    if !cli.watch {
        return Ok(());
    }

    let roots = watch_roots(&workspace);
    if roots.is_empty() {
        eprintln!("No valid paths to watch. Exiting.");
        return Ok(());
    }

    let (tx, rx) = channel();
    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Failed to send file event: {}", e);
                }
            }
        },
        notify::Config::default(),
    )?;

    eprintln!("Watching paths:");
    let mut watched = Vec::new();
    sync_watches(&mut watcher, &mut watched, roots)?;

    const DEBOUNCE_MS: u64 = 300;

    let mut last_change_time = Instant::now();
    let mut pending_scan = false;

    loop {
        if let Ok(event) = rx.recv_timeout(Duration::from_millis(100)) {
            if matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
            ) && event.paths.iter().any(|p| is_watched_file(p))
            {
                pending_scan = true;
                last_change_time = Instant::now();
            }
        }

        if pending_scan && last_change_time.elapsed() >= Duration::from_millis(DEBOUNCE_MS) {
            eprintln!("\nChanges detected, rescanning...");
            match run_scan(&cli, &settings) {
                Ok(workspace) => {
                    if let Err(e) = sync_watches(&mut watcher, &mut watched, watch_roots(&workspace)) {
                        eprintln!("Failed to update watched paths: {:#}", e);
                    }
                }
                Err(e) => eprintln!("Error during scan: {:#}", e),
            }
            eprintln!("\nWatching for changes (press Ctrl+C to stop)...\n");
            pending_scan = false;
        }
    }
}
