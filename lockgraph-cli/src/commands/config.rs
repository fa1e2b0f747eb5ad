//! `lockgraph config` command handler and configuration loading

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use lockgraph_catalog::CatalogConfig;
use lockgraph_core::config::LockgraphConfig;

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A TOML file (explicit `--config` or `./lockgraph.toml`).
    File(PathBuf),
    /// No file; built-in defaults plus environment overrides.
    Defaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Defaults => "(defaults + environment)".to_owned(),
        }
    }
}

/// Resolve which configuration source to use.
///
/// An explicit path must exist. Without one, `lockgraph.toml` in the working
/// directory is used when present.
pub fn resolve_source(explicit: Option<&Path>) -> ConfigSource {
    match explicit {
        Some(path) => ConfigSource::File(path.to_path_buf()),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.is_file() {
                ConfigSource::File(default.to_path_buf())
            } else {
                ConfigSource::Defaults
            }
        }
    }
}

/// Load, override from the environment, and validate.
///
/// Numeric catalog limits are validated here as well so that `config validate`
/// and `scan` reject the same files.
pub async fn load_config(source: &ConfigSource) -> Result<LockgraphConfig, CliError> {
    let config = match source {
        ConfigSource::File(path) => LockgraphConfig::load(path).await?,
        ConfigSource::Defaults => LockgraphConfig::from_env()?,
    };
    CatalogConfig::from_core(&config.catalog).validate()?;
    Ok(config)
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    source: &ConfigSource,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(source, writer).await,
        ConfigAction::Show { section } => execute_show(source, section, writer).await,
    }
}

/// Load and validate the configuration, reporting any error.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails.
async fn execute_validate(source: &ConfigSource, writer: &OutputWriter) -> Result<(), CliError> {
    info!(source = %source.describe(), "validating configuration");

    let report = match load_config(source).await {
        Ok(_) => ConfigValidationReport {
            source: source.describe(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: source.describe(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Command` if the section name is unknown.
async fn execute_show(
    source: &ConfigSource,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(source).await?;
    let report = build_config_report(&config, source, section.as_deref())?;
    writer.render(&report)?;
    Ok(())
}

/// Serialize the whole configuration or a single section.
pub fn build_config_report(
    config: &LockgraphConfig,
    source: &ConfigSource,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section {
        None => config.to_toml()?,
        Some("general") => to_toml(&config.general)?,
        Some("catalog") => to_toml(&config.catalog)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: general, catalog)"
            )));
        }
    };

    Ok(ConfigReport {
        source: source.describe(),
        section: section.map(str::to_owned),
        config: serde_json::to_value(config_section(config, section))?,
        config_toml,
    })
}

fn config_section(config: &LockgraphConfig, section: Option<&str>) -> serde_json::Value {
    let value = match section {
        Some("general") => serde_json::to_value(&config.general),
        Some("catalog") => serde_json::to_value(&config.catalog),
        _ => serde_json::to_value(config),
    };
    value.unwrap_or(serde_json::Value::Null)
}

fn to_toml<T: Serialize>(value: &T) -> Result<String, CliError> {
    toml::to_string_pretty(value).map_err(|e| CliError::Config(format!("serialize failed: {e}")))
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering; JSON output carries `config`.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: serde_json::Value,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{section}]");
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty when valid
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
