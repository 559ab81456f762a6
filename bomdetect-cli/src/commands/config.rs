//! `bomdetect config` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use bomdetect_core::config::BomDetectConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::ConfigSource;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
const SECTIONS: [&str; 5] = ["general", "project", "detectors", "search", "bom"];

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

/// Execute the config validate subcommand.
///
/// Loads the configuration (file + env overrides) and runs validation,
/// reporting the first error found.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (parse errors, invalid values).
async fn execute_validate(source: &ConfigSource, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %source.path().display(), "validating configuration");

    let report = match source.load().await {
        Ok(_) => ConfigValidationReport {
            source: source.path().display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: source.path().display().to_string(),
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

/// Execute the config show subcommand.
///
/// Displays the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Config` if loading fails or `CliError::Command` if section name is invalid.
async fn execute_show(
    source: &ConfigSource,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %source.path().display(), "loading configuration");

    let config = source.load().await?;
    let report = ConfigReport {
        source: source.path().display().to_string(),
        config_toml: section_toml(&config, section.as_deref())?,
        section,
    };

    writer.render(&report)?;

    Ok(())
}

/// Serialize the whole configuration or a single section to TOML.
fn section_toml(config: &BomDetectConfig, section: Option<&str>) -> Result<String, CliError> {
    let serialized = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("project") => toml::to_string_pretty(&config.project),
        Some("detectors") => toml::to_string_pretty(&config.detectors),
        Some("search") => toml::to_string_pretty(&config.search),
        Some("bom") => toml::to_string_pretty(&config.bom),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };
    Ok(serialized.unwrap_or_else(|e| format!("(serialization error: {})", e)))
}

/// Effective configuration, whole or one section.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Text output only
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let scope = match self.section {
            Some(ref section) => format!("[{section}]"),
            None => "all sections".to_owned(),
        };
        writeln!(w, "# {} from {}", scope.bold(), self.source)?;
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        if !self.config_toml.is_empty() && !self.config_toml.ends_with('\n') {
            writeln!(w)?;
        }

        Ok(())
    }
}

/// Outcome of `config validate`.
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

        if self.valid {
            writeln!(w, "{} {}", "ok".green().bold(), self.source)?;
        } else {
            writeln!(w, "{} {}", "invalid".red().bold(), self.source)?;
            for err in &self.errors {
                writeln!(w, "  - {}", err)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text<T: Render>(payload: &T) -> String {
        let mut buffer = Vec::new();
        payload
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_config_report_full_config_header() {
        let report = ConfigReport {
            source: "bomdetect.toml".to_owned(),
            section: None,
            config_toml: section_toml(&BomDetectConfig::default(), None).expect("full config"),
        };

        let output = text(&report);
        assert!(output.contains("all sections"));
        assert!(output.contains("bomdetect.toml"));
        assert!(output.contains("[project]"));
    }

    #[test]
    fn test_config_report_single_section() {
        let report = ConfigReport {
            source: "/etc/bomdetect.toml".to_owned(),
            section: Some("bom".to_owned()),
            config_toml: "aggregate_name = \"platform\"".to_owned(),
        };

        let output = text(&report);
        assert!(output.contains("[bom]"));
        assert!(output.ends_with("aggregate_name = \"platform\"\n"));
    }

    #[test]
    fn test_config_report_json_skips_toml_body() {
        let report = ConfigReport {
            source: "bomdetect.toml".to_owned(),
            section: Some("search".to_owned()),
            config_toml: "max_depth = 8".to_owned(),
        };

        let json = serde_json::to_string(&report).expect("JSON serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should parse JSON");

        assert_eq!(parsed["section"].as_str(), Some("search"));
        assert!(parsed.get("config_toml").is_none());
    }

    #[test]
    fn test_validation_report_valid() {
        let report = ConfigValidationReport {
            source: "bomdetect.toml".to_owned(),
            valid: true,
            errors: Vec::new(),
        };

        let output = text(&report);
        assert!(output.contains("ok"));
        assert!(!output.contains("  - "));
    }

    #[test]
    fn test_validation_report_lists_errors() {
        let report = ConfigValidationReport {
            source: "bomdetect.toml".to_owned(),
            valid: false,
            errors: vec![
                "invalid config value for 'bom.format': must be one of: cyclonedx, spdx"
                    .to_owned(),
            ],
        };

        let output = text(&report);
        assert!(output.contains("invalid"));
        assert!(output.contains("  - invalid config value for 'bom.format'"));

        let parsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&report).expect("serialize"))
                .expect("should parse JSON");
        assert_eq!(parsed["valid"].as_bool(), Some(false));
        assert_eq!(parsed["errors"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_section_toml_known_sections() {
        let config = BomDetectConfig::default();
        for section in SECTIONS {
            let toml = section_toml(&config, Some(section)).expect("known section");
            assert!(!toml.contains("serialization error"), "{section} should serialize");
        }
        let bom = section_toml(&config, Some("bom")).expect("bom section");
        assert!(bom.contains("output_dir"));
    }

    #[test]
    fn test_section_toml_full_config_has_all_sections() {
        let toml = section_toml(&BomDetectConfig::default(), None).expect("full config");
        for section in SECTIONS {
            assert!(toml.contains(&format!("[{section}]")), "missing [{section}]");
        }
    }

    #[test]
    fn test_section_toml_unknown_section() {
        let err = section_toml(&BomDetectConfig::default(), Some("network"))
            .expect_err("unknown section should fail");
        assert!(err.to_string().contains("unknown section: network"));
        assert_eq!(err.exit_code(), 1);
    }
}
