use clap::{Parser, Subcommand, ValueEnum};
use shelfcheck::config::AuditConfig;
use shelfcheck::coverage::{self, ScanOptions};
use shelfcheck::model::DatasetSnapshot;
use shelfcheck::profiles::ProfileRegistry;
use shelfcheck::{config, output, report, state};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "shelfcheck")]
#[command(about = "Coverage auditor for digitized journal archives")]
#[command(long_about = "\
Coverage auditor for digitized journal archives

The filesystem is the data source. One folder per journal, one subtree per
derivative kind (\"profile\"), one folder per year or year range, one file
per page:

  archive/
  ├── ArbeiterZeitung/
  │   ├── images/jpg/              # Reference profile (source of truth)
  │   │   ├── 1890/0001.jpg
  │   │   └── 1891-1893/0001.jpg   # Range folder (inclusive)
  │   ├── texts/tesseract-v1/      # OCR variant        → 1890/0001.txt
  │   ├── texts/ra-ocr/            # Another OCR variant
  │   ├── xml/                     #                    → 1890/0001.xml
  │   ├── altoxml/                 #                    → 1890/0001.alto.xml
  │   └── metadata/v1/             #                    → 1890/0001.yaml
  └── Volksblatt/

Every page under the reference profile is probed against every other
profile. OCR variants form an OR-group: a page \"has texts\" when any
texts-* profile has a file for it.

Run 'shelfcheck gen-config' for a documented shelfcheck.toml describing
the stock profile registry above.")]
#[command(version)]
struct Cli {
    /// Profile registry config (stock registry when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan an archive root and print the coverage summary
    Scan {
        /// Archive root containing one folder per journal
        root: PathBuf,
        /// Save the snapshot to this file after scanning
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Print a coverage report for one profile or composite group
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
        /// Profile or composite group name (e.g. "texts" or "xml")
        #[arg(long)]
        target: String,
        #[command(flatten)]
        source: SnapshotSource,
    },
    /// Show missing derivatives for one journal year
    Year {
        journal: String,
        year: u16,
        #[command(flatten)]
        source: SnapshotSource,
    },
    /// Validate the profile registry and exit
    Check,
    /// Print a stock shelfcheck.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    /// Years with zero coverage for the target
    MissingYears,
    /// Uncovered pages of partially covered years
    MissingPages,
}

/// Where a report's snapshot comes from: a fresh scan or a state file.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct SnapshotSource {
    /// Scan this archive root
    #[arg(long)]
    root: Option<PathBuf>,
    /// Load a previously saved snapshot
    #[arg(long)]
    state: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelfcheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let audit_config = match &cli.config {
        Some(path) => AuditConfig::load(path)?,
        None => AuditConfig::default(),
    };

    match cli.command {
        Command::Scan { root, state } => {
            let registry = ProfileRegistry::from_config(&audit_config)?;
            let snapshot = scan_archive(&root, &registry, &audit_config)?;
            output::print_snapshot_summary(&snapshot);
            if let Some(path) = state {
                state::save(&snapshot, &path)?;
                println!("State saved to {}", path.display());
            }
        }
        Command::Report {
            kind,
            target,
            source,
        } => {
            let registry = ProfileRegistry::from_config(&audit_config)?;
            if !registry.is_target(&target) {
                // Loaded snapshots may predate the current registry, so
                // this is advisory rather than fatal.
                warn!(name = %target, "not a profile or group of the current registry");
            }
            let snapshot = obtain_snapshot(&source, &registry, &audit_config)?;
            match kind {
                ReportKind::MissingYears => {
                    let rows = report::missing_years(&snapshot, &target);
                    output::print_missing_years(&target, &rows);
                }
                ReportKind::MissingPages => {
                    let rows = report::missing_pages(&snapshot, &target);
                    output::print_missing_pages(&target, &rows);
                }
            }
        }
        Command::Year {
            journal,
            year,
            source,
        } => {
            let registry = ProfileRegistry::from_config(&audit_config)?;
            let snapshot = obtain_snapshot(&source, &registry, &audit_config)?;
            match report::missing_files(&snapshot, &journal, year) {
                Some(rows) => {
                    let total = snapshot
                        .stats(&journal, year)
                        .map(|s| s.total_pages)
                        .unwrap_or(0);
                    output::print_year_detail(&journal, year, total, &rows);
                }
                None => {
                    return Err(format!("no year {year} for journal '{journal}' in snapshot").into());
                }
            }
        }
        Command::Check => {
            let registry = ProfileRegistry::from_config(&audit_config)?;
            let derivatives: Vec<&str> =
                registry.derivatives().map(|p| p.name.as_str()).collect();
            println!(
                "Registry OK: reference '{}', {} derivative profiles ({}), groups: {}",
                registry.reference().name,
                derivatives.len(),
                derivatives.join(", "),
                registry.groups().join(", ")
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn scan_archive(
    root: &std::path::Path,
    registry: &ProfileRegistry,
    audit_config: &AuditConfig,
) -> Result<DatasetSnapshot, Box<dyn std::error::Error>> {
    let options = ScanOptions {
        ranges_take_precedence: audit_config.ranges_take_precedence,
    };
    Ok(coverage::resolve(root, registry, &options)?)
}

fn obtain_snapshot(
    source: &SnapshotSource,
    registry: &ProfileRegistry,
    audit_config: &AuditConfig,
) -> Result<DatasetSnapshot, Box<dyn std::error::Error>> {
    match (&source.root, &source.state) {
        (Some(root), None) => scan_archive(root, registry, audit_config),
        (None, Some(path)) => Ok(state::load(path)?),
        // clap's arg group enforces exactly one; unreachable in practice.
        _ => Err("pass exactly one of --root or --state".into()),
    }
}
