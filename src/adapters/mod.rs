//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_report;
pub mod markdown_report;
pub mod typst_report;

use crate::ports::report_port::{ReportFormat, ReportPort};

pub fn report_adapter(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Markdown => Box::new(markdown_report::MarkdownReport),
        ReportFormat::Typst => Box::new(typst_report::TypstReport),
        ReportFormat::Json => Box::new(json_report::JsonReport),
    }
}
