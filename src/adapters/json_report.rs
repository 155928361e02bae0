//! JSON level document for machine consumers.

use serde::Serialize;

use crate::domain::error::FibextError;
use crate::domain::level::{LevelResult, LimitBand, RenderOptions};
use crate::domain::price_summary::PriceSummary;
use crate::ports::report_port::{LevelReport, ReportPort};

pub struct JsonReport;

#[derive(Serialize)]
struct Document<'a> {
    summary: &'a PriceSummary,
    options: RenderOptions,
    limit_band: LimitBand,
    levels: &'a [LevelResult],
}

impl ReportPort for JsonReport {
    fn render(&self, report: &LevelReport) -> Result<String, FibextError> {
        let doc = Document {
            summary: report.summary,
            options: report.options,
            limit_band: report.band(),
            levels: report.levels,
        };
        let mut out = serde_json::to_string_pretty(&doc).map_err(|e| FibextError::Render {
            reason: format!("JSON encoding failed: {}", e),
        })?;
        out.push('\n');
        Ok(out)
    }
}
