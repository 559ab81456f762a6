//! `bomdetect detectors` command handler

use std::io::Write;

use serde::Serialize;

use bomdetect_core::types::DetectorKind;
use bomdetect_engine::{Detector, EngineConfig, RunGate, default_detectors};

use crate::commands::ConfigSource;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `detectors` command.
pub async fn execute(source: &ConfigSource, writer: &OutputWriter) -> Result<(), CliError> {
    let config = source.load().await?;
    let engine_config = EngineConfig::from_core(&config);
    let report = build_detectors_report(&engine_config, &default_detectors())?;
    writer.render(&report)?;
    Ok(())
}

fn build_detectors_report(
    config: &EngineConfig,
    detectors: &[Box<dyn Detector>],
) -> Result<DetectorsReport, CliError> {
    let filter = config.filter()?;
    let gate = config.run_gate();

    let entries = DetectorKind::ALL
        .iter()
        .map(|kind| {
            let bundled = detectors.iter().find(|d| d.kind() == *kind);
            DetectorEntry {
                kind: *kind,
                bundled: bundled.is_some(),
                included: filter.should_include(kind.as_str()),
                external_tool: bundled.is_some_and(|d| d.requires_external_tool()),
                runnable: bundled.is_some_and(|d| gate.should_run(&**d)),
            }
        })
        .collect();

    Ok(DetectorsReport { detectors: entries })
}

/// Known detector kinds and how the current configuration treats them.
#[derive(Serialize)]
pub struct DetectorsReport {
    pub detectors: Vec<DetectorEntry>,
}

#[derive(Serialize)]
pub struct DetectorEntry {
    pub kind: DetectorKind,
    /// A detector for this kind ships with bomdetect
    pub bundled: bool,
    /// Passes the include/exclude patterns
    pub included: bool,
    pub external_tool: bool,
    /// Allowed by the run gate
    pub runnable: bool,
}

impl Render for DetectorsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "{:<10} {:<9} {:<9} {:<9} Runs",
            "Kind", "Bundled", "Included", "External"
        )?;
        writeln!(w, "{}", "-".repeat(50))?;

        for d in &self.detectors {
            let runs = d.bundled && d.included && d.runnable;
            let runs_str = if runs { "yes".green() } else { "no".dimmed() };
            writeln!(
                w,
                "{:<10} {:<9} {:<9} {:<9} {}",
                d.kind.as_str(),
                yes_no(d.bundled),
                yes_no(d.included),
                yes_no(d.external_tool),
                runs_str
            )?;
        }

        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
