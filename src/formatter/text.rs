//! Plain text formatter.
//!
//! One `artifact[#doc]:path:line: severity CODE message` line per finding,
//! followed by a summary line.

use crate::report::Report;

/// Format a report as text lines.
pub fn format(report: &Report) -> String {
    let mut lines: Vec<String> = report.findings.iter().map(|f| f.to_string()).collect();

    if let Some(totals) = report.totals {
        lines.push(format!(
            "Total requests: {} CPU cores, {} MiB memory",
            totals.cpu_cores, totals.memory_mib
        ));
    }

    lines.push(format!(
        "{} errors, {} warnings, {} info",
        report.error_count, report.warning_count, report.info_count
    ));
    lines.join("\n")
}
