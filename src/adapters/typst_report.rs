//! Typst level table.
//!
//! Produces a standalone `.typ` fragment: a heading, a summary list and a
//! three-column `#table`. Styles become `text(fill: …)` runs.

use crate::domain::error::FibextError;
use crate::domain::level::{Annotation, AnnotationStyle};
use crate::ports::report_port::{LevelReport, ReportPort};

pub struct TypstReport;

/// Escape characters that would otherwise start Typst markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '#' | '[' | ']' | '*' | '_' | '$' | '@' | '<' | '>' | '`' | '~'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn style_fill(style: AnnotationStyle) -> Option<&'static str> {
    match style {
        AnnotationStyle::Plain => None,
        AnnotationStyle::Custom => Some("orange"),
        AnnotationStyle::Short => Some("blue"),
        AnnotationStyle::Close => Some("green"),
    }
}

fn format_annotation(annotation: &Annotation) -> String {
    let text = escape(annotation.text);
    let mut cell = match style_fill(annotation.style) {
        Some(fill) => format!("#text(fill: {})[{}]", fill, text),
        None => text,
    };
    if let Some(warning) = annotation.warning {
        cell.push_str(&format!(" #text(fill: gray)[{}]", escape(warning.advisory())));
    }
    cell
}

impl ReportPort for TypstReport {
    fn render(&self, report: &LevelReport) -> Result<String, FibextError> {
        let s = report.summary;
        let band = report.band();

        let mut output = String::new();
        output.push_str(&format!(
            "= {}.{} extension levels\n\n",
            escape(&s.code),
            escape(&s.market)
        ));
        output.push_str(&format!("- Window: {} to {}\n", s.start_date, s.end_date));
        output.push_str(&format!("- Last trading day: {}\n", s.last_trading_date));
        output.push_str(&format!(
            "- High {:.2} / Low {:.2} / Close {:.2}\n",
            s.high, s.low, s.close
        ));
        output.push_str(&format!(
            "- Limit up {:.2} / Limit down {:.2}\n\n",
            band.limit_up, band.limit_down
        ));

        if report.levels.is_empty() {
            output.push_str("_No levels satisfy the limit band._\n");
            return Ok(output);
        }

        output.push_str("#table(\n");
        output.push_str("  columns: 3,\n");
        output.push_str("  align: (left, right, left),\n");
        output.push_str("  [*Method*], [*Value*], [*Note*],\n");
        for level in report.levels {
            output.push_str(&format!(
                "  [{}], [{:.2}], [{}],\n",
                escape(level.label),
                level.value,
                format_annotation(&level.annotation)
            ));
        }
        output.push_str(")\n");
        Ok(output)
    }
}
