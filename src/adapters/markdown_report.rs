//! Markdown level table with inline HTML colour spans.

use crate::domain::error::FibextError;
use crate::domain::level::{Annotation, AnnotationStyle};
use crate::ports::report_port::{LevelReport, ReportPort};

pub struct MarkdownReport;

fn style_color(style: AnnotationStyle) -> Option<&'static str> {
    match style {
        AnnotationStyle::Plain => None,
        AnnotationStyle::Custom => Some("orange"),
        AnnotationStyle::Short => Some("blue"),
        AnnotationStyle::Close => Some("green"),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

pub fn format_annotation(annotation: &Annotation) -> String {
    let text = escape_cell(annotation.text);
    let mut cell = match style_color(annotation.style) {
        Some(color) => format!("<span style=\"color:{}\">{}</span>", color, text),
        None => text,
    };
    if let Some(warning) = annotation.warning {
        cell.push_str(&format!(
            " <span style=\"color:gray\">{}</span>",
            warning.advisory()
        ));
    }
    cell
}

fn render_header(report: &LevelReport) -> String {
    let s = report.summary;
    let band = report.band();
    let mut out = String::new();
    out.push_str(&format!("### {}.{} extension levels\n\n", s.code, s.market));
    out.push_str(&format!("- Window: {} to {}\n", s.start_date, s.end_date));
    out.push_str(&format!("- Last trading day: {}\n", s.last_trading_date));
    out.push_str(&format!(
        "- High {:.2} / Low {:.2} / Close {:.2}\n",
        s.high, s.low, s.close
    ));
    out.push_str(&format!(
        "- Limit up {:.2} / Limit down {:.2}{}\n\n",
        band.limit_up,
        band.limit_down,
        if report.options.apply_limit {
            " (out-of-limit levels hidden)"
        } else {
            ""
        }
    ));
    out
}

impl ReportPort for MarkdownReport {
    fn render(&self, report: &LevelReport) -> Result<String, FibextError> {
        let mut out = render_header(report);

        if report.levels.is_empty() {
            out.push_str("_No levels satisfy the limit band._\n");
            return Ok(out);
        }

        out.push_str("| Method | Value | Note |\n");
        out.push_str("|---|---:|---|\n");
        for level in report.levels {
            out.push_str(&format!(
                "| {} | {:.2} | {} |\n",
                escape_cell(level.label),
                level.value,
                format_annotation(&level.annotation)
            ));
        }
        Ok(out)
    }
}
