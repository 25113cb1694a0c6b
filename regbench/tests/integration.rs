//! Integration tests for Regbench
//!
//! These tests drive the whole pipeline: suite files on disk, a stand-in
//! runtime script, collection, summarization and comparison.

use clap::Parser;
use proptest::prelude::*;
use regbench::{
    Classification, Cli, MetricRecord, Snapshot, SuiteReport, TIME_TOLERANCE, Verdict, classify,
    parse_collection_json, parse_metric_file, run_with_cli,
};
use std::path::{Path, PathBuf};

fn run(args: &[&str]) -> anyhow::Result<()> {
    let argv = std::iter::once("regbench").chain(args.iter().copied());
    run_with_cli(Cli::try_parse_from(argv)?)
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// Write a `core` suite with two groups
///
/// `lists` has three tests and one malformed line; `errors` has a test
/// that the current runtime rejects followed by one that is never reached.
fn write_suite(root: &Path) {
    let dir = root.join("core");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tests"), "lists\nerrors\n").unwrap();
    std::fs::write(
        dir.join("lists"),
        "(list 1 2)\t(1 2)\n(big-list)\t(1 2 3)\n(slow)\t:t\n(bad)\n",
    )
    .unwrap();
    std::fs::write(dir.join("errors"), "(boom)\t:nil\n(unreached)\t:t\n").unwrap();
}

/// A shell script standing in for the runtime
///
/// It only looks at the final `-e` argument: the measurement primitive
/// selects what to print, and marker words in the expression select the
/// numbers.
#[cfg(unix)]
fn write_runtime(dir: &Path, name: &str, big_bytes: i64, slow_time: &str, boom_fails: bool) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let boom = if boom_fails {
        "case \"$last\" in *boom*) echo \"error: boom\" >&2; exit 1 ;; esac\n"
    } else {
        ""
    };
    let script = format!(
        r#"#!/bin/sh
for last; do :; done
{boom}case "$last" in
  *perf:storage-delta*)
    case "$last" in *big-list*) used={big_bytes} ;; *) used=1000 ;; esac
    echo "g0 0 $used 0 g1 0 0 0 g2 0 0 0 g3 0 0 0 g4 0 0 0 g5 0 0 0 end" ;;
  *perf:time-delta*)
    case "$last" in *slow*) echo {slow_time} ;; *) echo 0.50 ;; esac ;;
  *perf:mem-delta*) echo 8192 ;;
  *list*) echo "(1 2)" ;;
  *) echo ":t" ;;
esac
"#
    );

    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A shell script standing in for GNU time: runs the command after
/// `-f FORMAT` and reports a fixed footprint
#[cfg(unix)]
fn write_time(dir: &Path, name: &str, resident_kb: i64) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        "#!/bin/sh\nshift 2\n\"$@\" >/dev/null 2>&1 || exit $?\necho \"0.01 0.02 0.05 {resident_kb} 3 4096\" >&2\n"
    );
    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Every process-spawning step lives in this one test so that no other
/// test forks while a script is still open for writing.
#[cfg(unix)]
#[test]
fn test_collect_summarize_compare() {
    let dir = tempfile::tempdir().unwrap();
    let suites = dir.path().join("namespaces");
    write_suite(&suites);
    let baseline_runtime = write_runtime(dir.path(), "baseline-sys", 1000, "0.50", false);
    let current_runtime = write_runtime(dir.path(), "current-sys", 1200, "0.90", true);

    let baseline_json = dir.path().join("baseline.json");
    let current_json = dir.path().join("current.json");
    for (runtime, output) in [(&baseline_runtime, &baseline_json), (&current_runtime, &current_json)] {
        run(&[
            "collect",
            "core",
            "--trials",
            "3",
            "--suite-dir",
            &path_arg(&suites),
            "--binary",
            &path_arg(runtime),
            "--no-progress",
            "-o",
            &path_arg(output),
        ])
        .unwrap();
    }

    // Collection keeps raw output and the malformed line
    let current = parse_collection_json(&std::fs::read_to_string(&current_json).unwrap()).unwrap();
    assert_eq!(current.ns, "core");
    assert_eq!(current.meta.as_ref().unwrap().trials, 3);
    assert_eq!(current.results.len(), 2);
    assert_eq!(current.results[0].results.len(), 4);
    // The storage failure aborts the rest of its group
    assert_eq!(current.results[1].results.len(), 1);
    let measured: Vec<_> = current.measured().map(|(g, r)| (g, r.line)).collect();
    assert_eq!(measured, [("lists", 1), ("lists", 2), ("lists", 3), ("errors", 1)]);

    // Summarize to metric lines
    let current_txt = dir.path().join("current.txt");
    run(&[
        "summarize",
        &path_arg(&current_json),
        "-o",
        &path_arg(&current_txt),
    ])
    .unwrap();
    let records = parse_metric_file(&std::fs::read_to_string(&current_txt).unwrap());
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].name, "core/lists");
    assert_eq!(records[0].bytes, 1000);
    assert_eq!(records[0].mem, 8192);
    assert!((records[0].time - 0.5).abs() < 1e-9);
    assert_eq!(records[1].bytes, 1200);
    assert!((records[2].time - 0.9).abs() < 1e-9);
    assert_eq!(records[3], MetricRecord::failed("core/errors", 1));

    // Compare a collection against metric lines
    let report_txt = dir.path().join("report.txt");
    let combined = dir.path().join("combined.txt");
    run(&[
        "compare",
        &path_arg(&baseline_json),
        &path_arg(&current_txt),
        "--save-combined",
        &path_arg(&combined),
        "-o",
        &path_arg(&report_txt),
    ])
    .unwrap();

    let report = std::fs::read_to_string(&report_txt).unwrap();
    let lines: Vec<_> = report.lines().collect();
    assert!(lines[0].starts_with("Performance Report "));
    assert_eq!(
        lines[2],
        "[+  ] 02 core/lists       heap: (1000/1200, 200, 1.20) \t pages: (2/2, 0, 1.00) \ttimes: (0.50/0.50, 0.00, 1.00)"
    );
    assert!(lines[3].starts_with("[  +] 03 core/lists "));
    assert!(lines[3].ends_with("times: (0.50/0.90, 0.40, 1.80)"));
    assert!(lines[4].starts_with("[***] 01 core/errors "));
    assert!(report.contains("ntests: 4 "));
    assert!(report.contains("unmatched: 1"));

    // The combined file reports the same way
    assert_eq!(std::fs::read_to_string(&combined).unwrap().lines().count(), 4);
    let json_report = dir.path().join("report.json");
    run(&[
        "report",
        &path_arg(&combined),
        "--format",
        "json",
        "-o",
        &path_arg(&json_report),
    ])
    .unwrap();
    let parsed: SuiteReport =
        serde_json::from_str(&std::fs::read_to_string(&json_report).unwrap()).unwrap();
    let markers: Vec<_> = parsed.lines.iter().map(|l| l.marker.as_str()).collect();
    assert_eq!(markers, ["+  ", "  +", "***"]);
    assert_eq!(parsed.totals.tests, 4);
    assert_eq!(parsed.totals.time_changed, 2);

    // Conformance against the current runtime
    let conformance = dir.path().join("conformance.json");
    run(&[
        "conformance",
        "core",
        "--suite-dir",
        &path_arg(&suites),
        "--binary",
        &path_arg(&current_runtime),
        "--format",
        "json",
        "-o",
        &path_arg(&conformance),
    ])
    .unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&conformance).unwrap()).unwrap();
    assert_eq!(value["module"], "core");
    let lists = &value["results"][0];
    assert_eq!(lists["group"], "lists");
    let passes: Vec<_> = lists["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["pass"].as_bool().unwrap())
        .collect();
    assert_eq!(passes, [true, false, true]);
    assert_eq!(lists["syntax_errors"][0]["line"], 4);
    let errors = &value["results"][1]["results"];
    assert_eq!(errors[0]["exception"], true);
    // Conformance does not abort a group on an exception
    assert_eq!(errors[1]["pass"], true);

    // Startup footprint, base and current side by side
    let base_time = write_time(dir.path(), "base-time", 10000);
    let current_time = write_time(dir.path(), "current-time", 12000);
    let base_fp = dir.path().join("base-fp.json");
    let current_fp = dir.path().join("current-fp.json");
    for (time, output) in [(&base_time, &base_fp), (&current_time, &current_fp)] {
        run(&[
            "footprint",
            "collect",
            "--runs",
            "2",
            "--binary",
            &path_arg(&baseline_runtime),
            "--time-binary",
            &path_arg(time),
            "--no-progress",
            "-o",
            &path_arg(output),
        ])
        .unwrap();
    }
    let fp: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&base_fp).unwrap()).unwrap();
    assert_eq!(fp["stats"][0], "0.01 0.02 0.05 10000 3 4096");
    assert_eq!(fp["stats"].as_array().unwrap().len(), 2);

    let fp_report = dir.path().join("fp.txt");
    run(&[
        "footprint",
        "report",
        &path_arg(&base_fp),
        &path_arg(&current_fp),
        "-o",
        &path_arg(&fp_report),
    ])
    .unwrap();
    let text = std::fs::read_to_string(&fp_report).unwrap();
    assert!(text.contains("resident 10000.00\tresident 12000.00"));
    assert!(text.contains("elapsed  0.05\telapsed  0.05"));
    assert!(text.contains("runs:    2/2\truns:    2/2"));
}

#[test]
fn test_list_reports_missing_suite() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&["list", "core", "--suite-dir", &path_arg(dir.path())]).unwrap_err();
    assert!(format!("{:#}", err).contains("tests"));
}

#[test]
fn test_unknown_namespace_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());
    let err = run(&["list", "lisp", "--suite-dir", &path_arg(dir.path())]).unwrap_err();
    assert!(err.to_string().contains("unknown namespace 'lisp'"));
}

#[test]
fn test_list_succeeds_with_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());
    run(&["list", "core", "--suite-dir", &path_arg(dir.path())]).unwrap();
}

#[test]
fn test_report_on_byte_only_file() {
    let dir = tempfile::tempdir().unwrap();
    let combined = dir.path().join("combined.txt");
    std::fs::write(
        &combined,
        "name base_bytes base_time bytes time\n\
         mu/cons 100 0.10 100 0.50\n\
         mu/cons 100 0.10 150 0.10\n\
         mu/cons 0 0.10 150 0.10\n",
    )
    .unwrap();
    let out = dir.path().join("report.json");

    run(&[
        "report",
        &path_arg(&combined),
        "--format",
        "json",
        "-o",
        &path_arg(&out),
    ])
    .unwrap();

    let report: SuiteReport = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    // Header skipped; the zero baseline is counted but not reported
    assert_eq!(report.totals.tests, 3);
    assert_eq!(report.totals.skipped, 1);
    assert_eq!(report.lines.len(), 1);
    assert_eq!(report.lines[0].sequence, 2);
    assert_eq!(report.lines[0].marker, "+  ");
    assert!(report.lines[0].classification.time.is_none());
}

fn unflagged(c: &Classification) -> bool {
    c.marker() == "   " && !c.is_flagged()
}

proptest! {
    #[test]
    fn prop_identical_snapshots_unchanged(
        bytes in 1i64..1_000_000,
        time in 0.0f64..100.0,
        mem in 0i64..1_000_000_000,
    ) {
        let snap = Snapshot::new(bytes, time, mem);
        prop_assert!(unflagged(&classify(&snap, &snap)));
    }

    #[test]
    fn prop_zero_baseline_is_skipped(
        bytes in -1i64..1_000_000,
        time in -1.0f64..100.0,
        mem in -1i64..1_000_000,
    ) {
        let c = classify(&Snapshot::new(0, 1.0, 4096), &Snapshot::new(bytes, time, mem));
        prop_assert!(c.is_skipped());
        prop_assert!(unflagged(&c));
    }

    #[test]
    fn prop_time_within_band_is_unchanged(
        base in 0.01f64..100.0,
        factor in (1.0 - TIME_TOLERANCE + 1e-6)..(1.0 + TIME_TOLERANCE - 1e-6),
    ) {
        let c = classify(&Snapshot::new(10, base, 4096), &Snapshot::new(10, base * factor, 4096));
        prop_assert_eq!(c.time_verdict(), Verdict::Unchanged);
    }

    #[test]
    fn prop_time_outside_band_is_flagged(
        base in 0.01f64..100.0,
        up in (1.0 + TIME_TOLERANCE + 1e-6)..10.0,
        down in 0.0f64..(1.0 - TIME_TOLERANCE - 1e-6),
    ) {
        let slower = classify(&Snapshot::new(10, base, 4096), &Snapshot::new(10, base * up, 4096));
        prop_assert_eq!(slower.time_verdict(), Verdict::Increased);

        let faster = classify(&Snapshot::new(10, base, 4096), &Snapshot::new(10, base * down, 4096));
        prop_assert_eq!(faster.time_verdict(), Verdict::Decreased);
    }

    #[test]
    fn prop_failed_current_is_corrupt(base in 1i64..1_000_000) {
        let c = classify(&Snapshot::new(base, 1.0, 4096), &Snapshot::new(-1, -1.0, -1));
        prop_assert_eq!(c.marker(), "***");
    }
}
