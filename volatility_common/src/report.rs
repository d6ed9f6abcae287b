//! Console and JSON rendering of a `RankedReport`.
use std::io::Write;

use crate::config::OutputFormat;
use crate::rank::RankedReport;
use crate::result::Result;
use crate::volatility::VolatilityStat;

/// Printed instead of the report when no file produced a statistic.
pub const NO_DATA: &str = "No data to analyze.";

const MAX_HEADER: &str = "Maximum volatility";
const MIN_HEADER: &str = "Minimum volatility";
const ZERO_HEADER: &str = "Zero volatility";

/// Render the fixed console layout.
pub fn render_text(report: &RankedReport) -> String {
    let mut out = String::new();
    push_group(&mut out, MAX_HEADER, &report.top);
    push_group(&mut out, MIN_HEADER, &report.bottom);
    out.push_str(ZERO_HEADER);
    out.push('\n');
    if !report.zeros.is_empty() {
        let tickers: Vec<&str> = report.zeros.iter().map(|s| s.ticker.as_str()).collect();
        out.push('\t');
        out.push_str(&tickers.join(", "));
        out.push('\n');
    }
    out
}

/// Render the report as a JSON document.
pub fn render_json(report: &RankedReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write `report` (or the no-data message) to `out` in the requested format.
pub fn print(out: &mut impl Write, report: Option<&RankedReport>, format: OutputFormat) -> Result<()> {
    let Some(report) = report else {
        writeln!(out, "{}", NO_DATA)?;
        return Ok(());
    };
    match format {
        OutputFormat::Text => write!(out, "{}", render_text(report))?,
        OutputFormat::Json => writeln!(out, "{}", render_json(report)?)?,
    }
    out.flush()?;
    Ok(())
}

fn push_group(out: &mut String, header: &str, stats: &[VolatilityStat]) {
    out.push_str(header);
    out.push('\n');
    for stat in stats {
        out.push_str(&format!("\t{} - {:6.2} %\n", stat.ticker, stat.volatility));
    }
}
