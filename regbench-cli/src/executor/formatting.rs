//! Output Formatting
//!
//! Fixed-width terminal output:
//! - Performance reports: timestamped header, one line per reported test
//!   with its `[bytes memory time]` marker, and a totals trailer
//! - Suite plans for `list`
//! - Conformance summaries, one line per group plus a module total
//! - Footprint reports, base and current means side by side

use super::conformance::{ConformanceCounts, ConformanceReport};
use crate::planner::ExecutionPlan;
use chrono::Local;
use regbench_core::SuiteEntry;
use regbench_report::{ReportLine, SuiteReport};
use regbench_stats::{AxisComparison, FootprintSummary};

const RULE: &str = "------------------------------";

/// Format a suite report as the fixed-width performance report
pub fn format_text_report(report: &SuiteReport) -> String {
    let mut output = String::new();

    let date = report.timestamp.with_timezone(&Local).format("%m/%d/%Y %H:%M:%S");
    output.push_str(&format!("Performance Report {}\n", date));
    output.push_str(RULE);
    output.push('\n');

    for line in &report.lines {
        output.push_str(&format_report_line(line));
        output.push('\n');
    }

    let totals = &report.totals;
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(
        "ntests: {:<4} size: {:>6}  pages: {:>5}  times: {:>5}\n",
        totals.tests, totals.bytes_changed, totals.memory_changed, totals.time_changed
    ));
    output.push_str(&format!(
        "deltas:      bytes: {:>5}  mem_virt: {:>5}  times: {:5.2}\n",
        totals.delta_bytes, totals.delta_pages, totals.delta_time
    ));
    if totals.skipped > 0 || totals.unmatched > 0 {
        output.push_str(&format!(
            "skipped: {:<4} unmatched: {}\n",
            totals.skipped, totals.unmatched
        ));
    }

    output
}

/// Format one reported test
pub fn format_report_line(line: &ReportLine) -> String {
    let c = &line.classification;
    let mut text = format!("[{}] {:02} {:<16}", line.marker, line.sequence, line.name);

    match (&c.bytes, &c.memory, &c.time) {
        (Some(bytes), None, None) => {
            text.push_str(&format!(" bytes: {}", int_tuple(bytes)));
        }
        (bytes, memory, time) => {
            if let Some(bytes) = bytes {
                text.push_str(&format!(" heap: {}", int_tuple(bytes)));
            }
            if let Some(memory) = memory {
                text.push_str(&format!(" \t pages: {}", int_tuple(memory)));
            }
            if let Some(time) = time {
                text.push_str(&format!(" \ttimes: {}", time_tuple(time)));
            }
        }
    }

    text
}

fn int_tuple(axis: &AxisComparison<i64>) -> String {
    format!(
        "({}/{}, {}, {})",
        axis.baseline,
        axis.current,
        axis.delta,
        ratio(axis.ratio)
    )
}

fn time_tuple(axis: &AxisComparison<f64>) -> String {
    format!(
        "({:.2}/{:.2}, {:.2}, {})",
        axis.baseline,
        axis.current,
        axis.delta,
        ratio(axis.ratio)
    )
}

fn ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "-".to_string(), |r| format!("{:.2}", r))
}

/// Format the execution plan for `list`
pub fn format_plan(plan: &ExecutionPlan) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}: {} groups, {} tests, {} syntax errors\n",
        plan.namespace,
        plan.groups.len(),
        plan.test_count(),
        plan.syntax_error_count()
    ));

    for group in &plan.groups {
        output.push_str(&format!("\n  {}\n", group.name));
        for entry in &group.entries {
            match entry {
                SuiteEntry::Test(test) => {
                    output.push_str(&format!("    {:>4}  {}\n", test.line, test.expression));
                }
                SuiteEntry::SyntaxError { line, fields } => {
                    output.push_str(&format!(
                        "    {:>4}  test syntax: {}\n",
                        line,
                        fields.join(" | ")
                    ));
                }
            }
        }
    }

    output
}

/// Format conformance totals, one line per group and a module total
pub fn format_conformance(report: &ConformanceReport) -> String {
    let mut output = String::new();

    for group in &report.results {
        let c = group.counts();
        output.push_str(&format!(
            "{:<14} {:<10} {}\n",
            report.module,
            group.group,
            conformance_counts(&c, 8)
        ));
        for error in &group.syntax_errors {
            output.push_str(&format!(
                "{:<14} {:<10} line {}: test syntax\n",
                report.module, group.group, error.line
            ));
        }
    }

    let totals = report.totals();
    output.push_str(&format!(
        "{:<26}{}\n",
        report.module,
        conformance_counts(&totals, 9)
    ));

    output
}

fn conformance_counts(c: &ConformanceCounts, width: usize) -> String {
    format!(
        "total: {:<w$} pass: {:<w$} fail: {:<w$} exceptions: {:<w$}",
        c.total,
        c.passed,
        c.failed,
        c.exceptions,
        w = width
    )
}

/// Format base and current startup footprints side by side
pub fn format_footprint(base: &FootprintSummary, current: &FootprintSummary) -> String {
    let mut output = String::from("Footprint Report\n");
    output.push_str(RULE);
    output.push('\n');

    let columns = |summary: &FootprintSummary| {
        [
            ("system", summary.system),
            ("user", summary.user),
            ("elapsed", summary.elapsed),
            ("resident", summary.resident_kb),
            ("waits", summary.waits),
        ]
    };
    for ((label, b), (_, c)) in columns(base).into_iter().zip(columns(current)) {
        output.push_str(&format!("{:<8} {:4.2}\t{:<8} {:4.2}\n", label, b, label, c));
    }

    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(
        "runs:    {}/{}\truns:    {}/{}\n",
        base.successes,
        base.successes + base.failures,
        current.successes,
        current.successes + current.failures
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::conformance::{ConformanceGroup, ConformanceResult};
    use crate::planner::build_plan;
    use regbench_core::{Namespace, Suite, parse_group};
    use regbench_report::Accumulator;
    use regbench_stats::{Snapshot, classify};

    fn line(name: &str, base: Snapshot, cur: Snapshot) -> ReportLine {
        let mut acc = Accumulator::new(true);
        acc.accumulate(name, classify(&base, &cur));
        acc.finalize().lines.remove(0)
    }

    #[test]
    fn byte_regression_line() {
        let text = format_report_line(&line(
            "core/lists",
            Snapshot::new(1000, 2.0, 8192),
            Snapshot::new(1200, 2.1, 8192),
        ));

        assert_eq!(
            text,
            "[+  ] 01 core/lists       heap: (1000/1200, 200, 1.20) \t pages: (2/2, 0, 1.00) \ttimes: (2.00/2.10, 0.10, 1.05)"
        );
    }

    #[test]
    fn byte_only_line() {
        let text = format_report_line(&line(
            "mu/cons",
            Snapshot::bytes_only(100),
            Snapshot::bytes_only(150),
        ));
        assert_eq!(text, "[+  ] 01 mu/cons          bytes: (100/150, 50, 1.50)");
    }

    #[test]
    fn zero_baseline_pages_render_dash() {
        let text = format_report_line(&line(
            "core/heap",
            Snapshot::new(10, 1.0, 0),
            Snapshot::new(10, 1.0, 4096),
        ));
        assert!(text.contains("pages: (0/1, 1, -)"));
        assert!(text.starts_with("[ + ]"));
    }

    #[test]
    fn report_has_header_and_trailer() {
        let mut acc = Accumulator::new(false);
        acc.accumulate(
            "core/lists",
            classify(&Snapshot::new(1000, 2.0, 8192), &Snapshot::new(1000, 2.4, 8192)),
        );
        let text = format_text_report(&acc.finalize());
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].starts_with("Performance Report "));
        assert_eq!(lines[1], RULE);
        assert!(lines[2].starts_with("[  +] 01 core/lists"));
        assert_eq!(lines[3], RULE);
        assert_eq!(lines[4], "ntests: 1    size:      0  pages:     0  times:     1");
        assert_eq!(lines[5], "deltas:      bytes:     0  mem_virt:     0  times:  0.40");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn plan_lists_syntax_errors() {
        let suite = Suite {
            namespace: Namespace::Mu,
            groups: vec![parse_group(Namespace::Mu, "cons", "(cons 1 2)\t(1 . 2)\n(foo)\n")],
        };
        let text = format_plan(&build_plan(suite, None));

        assert!(text.starts_with("mu: 1 groups, 1 tests, 1 syntax errors\n"));
        assert!(text.contains("       1  (cons 1 2)\n"));
        assert!(text.contains("       2  test syntax: (foo)\n"));
    }

    #[test]
    fn conformance_summary_columns() {
        let report = ConformanceReport {
            module: "core".to_string(),
            results: vec![ConformanceGroup {
                group: "lists".to_string(),
                results: vec![
                    ConformanceResult {
                        line: 1,
                        exception: false,
                        pass: true,
                        expect: "1".to_string(),
                        obtain: "1".to_string(),
                    },
                    ConformanceResult {
                        line: 2,
                        exception: true,
                        pass: false,
                        expect: "2".to_string(),
                        obtain: String::new(),
                    },
                ],
                syntax_errors: Vec::new(),
            }],
        };

        let text = format_conformance(&report);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "core           lists      total: 2        pass: 1        fail: 0        exceptions: 1       "
        );
        assert_eq!(
            lines[1],
            "core                      total: 2         pass: 1         fail: 0         exceptions: 1        "
        );
    }

    #[test]
    fn footprint_columns_side_by_side() {
        let base = FootprintSummary {
            system: 0.02,
            user: 0.2,
            elapsed: 0.5,
            resident_kb: 11000.0,
            waits: 3.0,
            successes: 20,
            failures: 0,
        };
        let current = FootprintSummary {
            elapsed: 0.75,
            failures: 1,
            successes: 19,
            ..base.clone()
        };

        let text = format_footprint(&base, &current);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Footprint Report");
        assert_eq!(lines[2], "system   0.02\tsystem   0.02");
        assert_eq!(lines[4], "elapsed  0.50\telapsed  0.75");
        assert_eq!(lines[5], "resident 11000.00\tresident 11000.00");
        assert_eq!(lines[6], "waits    3.00\twaits    3.00");
        assert_eq!(lines[8], "runs:    20/20\truns:    19/20");
    }
}
