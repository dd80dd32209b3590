//src/report.rs

//! Text renderings of batch results. Nothing here touches the filesystem;
//! callers decide where the text goes.

use std::fmt::Write;

use crate::types::{SampleReport, TypingResult, Verdict};
use crate::AssemblyResults;

pub const QUALITY_REPORT_HEADER: &str = "sample_id\tmean_quality\tstatus";
pub const TYPING_REPORT_HEADER: &str =
    "sample_id,designation,type,subtype,identity_percent,overlap_bp,verdict";

fn id_list<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let ids: Vec<&str> = ids.collect();
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.join(", ")
    }
}

/// Tab-separated per-sample quality table.
pub fn quality_report(reports: &[SampleReport]) -> String {
    let mut output = String::new();
    output.push_str(QUALITY_REPORT_HEADER);
    output.push('\n');
    for row in reports {
        let _ = writeln!(
            output,
            "{}\t{:.2}\t{}",
            row.sample_id,
            row.mean_quality,
            row.status.label()
        );
    }
    output
}

/// Comma-separated typing table, one row per sample.
pub fn typing_report(results: &[TypingResult]) -> String {
    let mut output = String::new();
    output.push_str(TYPING_REPORT_HEADER);
    output.push('\n');
    for r in results {
        let c = &r.classification;
        let _ = writeln!(
            output,
            "{},{},{},{},{:.2},{},{}",
            r.sample_id(),
            r.designation,
            r.type_name,
            r.subtype_name,
            c.identity_percent,
            c.overlap_length,
            c.verdict.label()
        );
    }
    output
}

pub fn assembly_summary(results: &AssemblyResults) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Sample groups: {}", results.total_groups);
    let _ = writeln!(output, "Assembled pairs: {}", results.consensuses.len());
    let _ = writeln!(output, "Unpaired files: {}", results.unpaired_files.len());
    let _ = writeln!(
        output,
        "Failed samples: {}",
        id_list(results.failures.iter().map(|f| f.sample_id.as_str()))
    );
    for failure in &results.failures {
        let _ = writeln!(output, "  {}: {}", failure.sample_id, failure.reason);
    }
    output
}

pub fn typing_summary(results: &[TypingResult]) -> String {
    let passed = results
        .iter()
        .filter(|r| r.classification.verdict == Verdict::Pass)
        .count();

    let mut output = String::new();
    let _ = writeln!(output, "Typed samples: {}", results.len());
    let _ = writeln!(output, "Passed QC: {}", passed);
    let _ = writeln!(output, "Failed QC: {}", results.len() - passed);
    let _ = writeln!(
        output,
        "Failed samples: {}",
        id_list(
            results
                .iter()
                .filter(|r| r.classification.verdict == Verdict::Fail)
                .map(|r| r.sample_id())
        )
    );
    output
}
