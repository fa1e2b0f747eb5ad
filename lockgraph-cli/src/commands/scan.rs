//! `lockgraph scan` command handler

use std::io::Write;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lockgraph_catalog::config::validate_scan_dir;
use lockgraph_catalog::{
    CatalogConfig, CatalogConfigBuilder, CatalogOutcome, CatalogerBuilder, Completeness,
    DocumentFormat, SbomGenerator, Severity,
};
use lockgraph_core::config::LockgraphConfig;

use crate::cli::{ScanArgs, ScanFormat};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
///
/// `table` renders a report on stdout. Document formats write the document to
/// stdout and the summary to stderr.
///
/// # Errors
///
/// * `CliError::Partial` - the run was interrupted or timed out
/// * `CliError::DiagnosticsGate` - `--fail-on-diagnostics` and warnings were recorded
pub async fn execute(
    args: ScanArgs,
    config: &LockgraphConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let catalog_config = build_catalog_config(&args, config)?;
    let format = args
        .format
        .unwrap_or_else(|| scan_format_for(catalog_config.output_format));

    let cancel = CancellationToken::new();
    let interrupt = spawn_interrupt_listener(cancel.clone());
    let result = run_scan(catalog_config, cancel).await;
    interrupt.abort();
    let outcome = result?;

    let summary = ScanSummary::from_outcome(&outcome);
    match document_format(format) {
        None => writer.render(&ScanReport::from_outcome(&outcome, summary))?,
        Some(doc_format) => {
            let document = SbomGenerator::new(doc_format).generate(&outcome.catalog)?;
            writer.document(&document.content)?;
            writer.report(&summary)?;
        }
    }

    check_exit_status(&outcome, args.fail_on_diagnostics)
}

/// Run the cataloger once with the given configuration.
pub async fn run_scan(
    config: CatalogConfig,
    cancel: CancellationToken,
) -> Result<CatalogOutcome, CliError> {
    info!(
        dirs = ?config.scan_dirs,
        workers = config.effective_workers(),
        timeout_secs = config.timeout_secs,
        "starting catalog scan"
    );

    let cataloger = CatalogerBuilder::new().config(config).build()?;
    let outcome = cataloger.catalog_dirs(cancel).await?;
    Ok(outcome)
}

/// Merge CLI flags over the `[catalog]` section and validate the result.
pub fn build_catalog_config(
    args: &ScanArgs,
    config: &LockgraphConfig,
) -> Result<CatalogConfig, CliError> {
    let base = CatalogConfig::from_core(&config.catalog);

    let scan_dirs = if args.paths.is_empty() {
        base.scan_dirs
    } else {
        let mut dirs = Vec::with_capacity(args.paths.len());
        for path in &args.paths {
            let dir = path.to_string_lossy().into_owned();
            validate_scan_dir(&dir)?;
            dirs.push(dir);
        }
        dirs
    };

    let built = CatalogConfigBuilder::new()
        .scan_dirs(scan_dirs)
        .max_file_size(base.max_file_size)
        .max_packages(base.max_packages)
        .max_depth(base.max_depth)
        .workers(args.workers.unwrap_or(base.workers))
        .timeout_secs(args.timeout.unwrap_or(base.timeout_secs))
        .exclude_dirs(base.exclude_dirs)
        .output_format(base.output_format)
        .build()?;
    Ok(built)
}

/// Map the run outcome to the process result.
///
/// An incomplete run takes precedence over the diagnostics gate.
pub fn check_exit_status(
    outcome: &CatalogOutcome,
    fail_on_diagnostics: bool,
) -> Result<(), CliError> {
    if let Completeness::Partial { skipped } = outcome.completeness {
        return Err(CliError::Partial { skipped });
    }

    if fail_on_diagnostics && outcome.diagnostics.has_warnings() {
        return Err(CliError::DiagnosticsGate {
            warnings: outcome.diagnostics.warnings().count(),
        });
    }

    Ok(())
}

fn spawn_interrupt_listener(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, abandoning unstarted manifests");
            cancel.cancel();
        }
    })
}

fn document_format(format: ScanFormat) -> Option<DocumentFormat> {
    match format {
        ScanFormat::Table => None,
        ScanFormat::Json => Some(DocumentFormat::Json),
        ScanFormat::Cyclonedx => Some(DocumentFormat::CycloneDx),
        ScanFormat::Spdx => Some(DocumentFormat::Spdx),
    }
}

fn scan_format_for(format: DocumentFormat) -> ScanFormat {
    match format {
        DocumentFormat::CycloneDx => ScanFormat::Cyclonedx,
        DocumentFormat::Spdx => ScanFormat::Spdx,
        DocumentFormat::Json => ScanFormat::Json,
    }
}

/// Run statistics and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub completeness: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    pub manifests: usize,
    pub processed: usize,
    pub malformed: usize,
    pub unsupported: usize,
    pub packages: usize,
    pub relationships: usize,
    pub elapsed_ms: u128,
    pub diagnostics: Vec<DiagnosticEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEntry {
    pub severity: String,
    pub kind: String,
    pub message: String,
}

impl ScanSummary {
    pub fn from_outcome(outcome: &CatalogOutcome) -> Self {
        let skipped = match outcome.completeness {
            Completeness::Complete => None,
            Completeness::Partial { skipped } => Some(skipped),
        };

        Self {
            completeness: outcome.completeness.as_str().to_owned(),
            skipped,
            manifests: outcome.stats.manifests,
            processed: outcome.stats.processed,
            malformed: outcome.stats.malformed,
            unsupported: outcome.stats.unsupported,
            packages: outcome.catalog.package_count(),
            relationships: outcome.catalog.relationship_count(),
            elapsed_ms: outcome.stats.elapsed.as_millis(),
            diagnostics: outcome
                .diagnostics
                .iter()
                .map(|d| DiagnosticEntry {
                    severity: d.severity().to_string(),
                    kind: d.kind().as_str().to_owned(),
                    message: d.to_string(),
                })
                .collect(),
        }
    }

    fn warning_count(&self) -> usize {
        let warning = Severity::Warning.to_string();
        self.diagnostics
            .iter()
            .filter(|d| d.severity == warning)
            .count()
    }
}

impl Render for ScanSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let status = match self.skipped {
            None => self.completeness.green().bold(),
            Some(_) => self.completeness.yellow().bold(),
        };
        write!(w, "Result: {status}")?;
        if let Some(skipped) = self.skipped {
            write!(w, " ({skipped} manifest(s) not processed)")?;
        }
        writeln!(w)?;

        writeln!(
            w,
            "Manifests: {} found, {} processed, {} malformed, {} unsupported",
            self.manifests, self.processed, self.malformed, self.unsupported
        )?;
        writeln!(
            w,
            "Catalog: {} packages, {} relationships ({} ms)",
            self.packages, self.relationships, self.elapsed_ms
        )?;

        if self.diagnostics.is_empty() {
            writeln!(w, "{}", "No diagnostics.".green())?;
            return Ok(());
        }

        let warnings = self.warning_count();
        let header = format!(
            "Diagnostics: {} ({} warning)",
            self.diagnostics.len(),
            warnings
        );
        if warnings > 0 {
            writeln!(w, "{}", header.red().bold())?;
        } else {
            writeln!(w, "{}", header.bold())?;
        }

        for d in &self.diagnostics {
            let severity = match d.severity.as_str() {
                "warning" => d.severity.yellow(),
                _ => d.severity.dimmed(),
            };
            writeln!(w, "  [{severity:<7}] {:<22} {}", d.kind, d.message)?;
        }

        Ok(())
    }
}

/// Package table plus the run summary.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub packages: Vec<PackageEntry>,
    pub summary: ScanSummary,
}

#[derive(Debug, Serialize)]
pub struct PackageEntry {
    pub name: String,
    pub version: String,
    pub ecosystem: String,
    pub purl: String,
    pub locations: Vec<String>,
    pub dependencies: usize,
}

impl ScanReport {
    pub fn from_outcome(outcome: &CatalogOutcome, summary: ScanSummary) -> Self {
        let catalog = &outcome.catalog;
        let packages = catalog
            .packages()
            .map(|p| PackageEntry {
                name: p.name().to_owned(),
                version: p.version().to_owned(),
                ecosystem: p.ecosystem().to_string(),
                purl: p.purl().to_owned(),
                locations: p.locations.iter().map(|l| l.path().to_owned()).collect(),
                dependencies: catalog.dependencies_of(&p.identity()).count(),
            })
            .collect();

        Self { packages, summary }
    }
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.packages.is_empty() {
            writeln!(w, "{}", "No packages found.".yellow())?;
        } else {
            writeln!(
                w,
                "{:<40} {:<16} {:<10} {:>4}  Location",
                "Package", "Version", "Ecosystem", "Deps"
            )?;
            writeln!(w, "{}", "-".repeat(96))?;

            for p in &self.packages {
                let location = match p.locations.as_slice() {
                    [] => String::new(),
                    [only] => only.clone(),
                    [first, rest @ ..] => format!("{first} (+{})", rest.len()),
                };
                writeln!(
                    w,
                    "{:<40} {:<16} {:<10} {:>4}  {}",
                    p.name.bold(),
                    p.version,
                    p.ecosystem,
                    p.dependencies,
                    location.dimmed()
                )?;
            }
        }

        writeln!(w)?;
        self.summary.render_text(w)
    }
}
