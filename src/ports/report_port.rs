//! Report rendering port trait.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::domain::error::FibextError;
use crate::domain::level::{LevelResult, LimitBand, RenderOptions};
use crate::domain::price_summary::PriceSummary;

/// Everything a renderer needs for one level table.
pub struct LevelReport<'a> {
    pub summary: &'a PriceSummary,
    pub options: RenderOptions,
    pub levels: &'a [LevelResult],
}

impl LevelReport<'_> {
    pub fn band(&self) -> LimitBand {
        LimitBand::new(self.summary.high, self.summary.low)
    }
}

/// Port for turning a level table into a document.
pub trait ReportPort {
    fn render(&self, report: &LevelReport) -> Result<String, FibextError>;

    /// Default implementation: render, then write to `output_path` or stdout.
    fn write(&self, report: &LevelReport, output_path: Option<&Path>) -> Result<(), FibextError> {
        let document = self.render(report)?;
        match output_path {
            Some(path) => fs::write(path, document)?,
            None => std::io::stdout().write_all(document.as_bytes())?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Typst,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "typst" | "typ" => Ok(ReportFormat::Typst),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Typst => write!(f, "typst"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}
