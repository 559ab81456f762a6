//! `bomdetect scan` command handler

use std::io::Write;

use tracing::info;

use bomdetect_core::config::BomDetectConfig;
use bomdetect_engine::{
    BomFormat, EngineConfig, EngineConfigBuilder, ProjectManager, RunReport, default_detectors,
};

use crate::cli::ScanArgs;
use crate::commands::ConfigSource;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
///
/// Returns the process exit code derived from the run's exit classification.
pub async fn execute(
    args: ScanArgs,
    source: &ConfigSource,
    writer: &OutputWriter,
) -> Result<i32, CliError> {
    let config = source.load().await?;
    let engine_config = build_engine_config(&config, &args)?;

    info!(path = %args.path.display(), output_dir = %engine_config.output_dir.display(), "starting scan");

    let manager = ProjectManager::new(engine_config, default_detectors())?;
    let scan_root = args.path.clone();
    let report = tokio::task::spawn_blocking(move || manager.run(&scan_root))
        .await
        .map_err(|e| CliError::Command(format!("scan task failed: {e}")))?;

    writer.render(&report)?;

    Ok(report.exit.exit_code())
}

/// Layer CLI flags over the loaded configuration.
fn build_engine_config(config: &BomDetectConfig, args: &ScanArgs) -> Result<EngineConfig, CliError> {
    let mut builder = EngineConfigBuilder::from_core(config);

    if let Some(ref dir) = args.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(ref name) = args.aggregate_name {
        builder = builder.aggregate_name(name);
    }
    if let Some(ref name) = args.project_name {
        builder = builder.project_name(name);
    }
    if let Some(ref version) = args.project_version {
        builder = builder.project_version(version);
    }
    if let Some(ref kind) = args.preferred_detector {
        builder = builder.preferred_detector(kind.clone());
    }
    if !args.include.is_empty() {
        builder = builder.include(args.include.clone());
    }
    if !args.exclude.is_empty() {
        builder = builder.exclude(args.exclude.clone());
    }
    if let Some(ref format) = args.format {
        builder = builder.format(parse_bom_format(format)?);
    }
    if let Some(depth) = args.max_depth {
        builder = builder.max_depth(depth);
    }
    if args.no_external_tools {
        builder = builder.allow_external_tools(false);
    }

    Ok(builder.build()?)
}

fn parse_bom_format(s: &str) -> Result<BomFormat, CliError> {
    BomFormat::from_str_loose(s).ok_or_else(|| {
        CliError::Command(format!(
            "invalid BOM format: {} (expected: cyclonedx, spdx)",
            s
        ))
    })
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {}", self.scan_root.display().to_string().bold())?;
        writeln!(
            w,
            "Project: {} {}",
            self.identity.name.bold(),
            self.identity.version
        )?;
        writeln!(w)?;

        let applicable: Vec<_> = self
            .evaluations
            .iter()
            .filter(|e| e.result != "not_applicable")
            .collect();

        if applicable.is_empty() {
            writeln!(w, "{}", "No applicable detectors found.".yellow())?;
        } else {
            writeln!(w, "{:<10} {:<10} {:<7} Directory", "Detector", "Result", "Graphs")?;
            writeln!(w, "{}", "-".repeat(70))?;
            for e in applicable {
                let result_colored = match e.result {
                    "success" => e.result.green(),
                    "failure" => e.result.red(),
                    _ => e.result.dimmed(),
                };
                writeln!(
                    w,
                    "{:<10} {:<10} {:<7} {}",
                    e.kind.as_str(),
                    result_colored,
                    e.graphs,
                    e.path.display()
                )?;
                if let Some(ref reason) = e.reason {
                    writeln!(w, "  {}", reason.red())?;
                }
            }
        }

        if !self.code_locations.is_empty() {
            writeln!(w)?;
            writeln!(w, "Code locations:")?;
            for name in &self.code_locations {
                writeln!(w, "  {name}")?;
            }
        }

        if !self.artifacts.is_empty() || !self.artifact_errors.is_empty() {
            writeln!(w)?;
            writeln!(w, "Documents:")?;
            for artifact in &self.artifacts {
                writeln!(
                    w,
                    "  {} ({}, {} components)",
                    artifact.path.display(),
                    artifact.format,
                    artifact.component_count
                )?;
            }
            for failure in &self.artifact_errors {
                writeln!(w, "  {} {}", failure.file_name, failure.error.red())?;
            }
        }

        if !self.statuses.is_empty() {
            writeln!(w)?;
            writeln!(w, "Status:")?;
            for (kind, status) in &self.statuses {
                let status_str = status.to_string();
                let status_colored = if status_str == "success" {
                    status_str.green()
                } else {
                    status_str.red()
                };
                writeln!(w, "  {:<10} {}", kind.as_str(), status_colored)?;
            }
        }

        writeln!(w)?;
        let exit_str = format!("{} (exit code {})", self.exit, self.exit.exit_code());
        if self.exit.is_success() {
            writeln!(w, "Result: {}", exit_str.green().bold())?;
        } else {
            writeln!(w, "Result: {}", exit_str.red().bold())?;
        }

        Ok(())
    }
}
