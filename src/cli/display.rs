//! Terminal display for impact reports

use colored::Colorize;

use diffimpact::outline::{CALLERS_TOPIC, CALLS_TOPIC};
use diffimpact::ImpactReport;

/// Print the report as an indented tree, mirroring the outline export
pub(crate) fn display_report_text(report: &ImpactReport) {
    if report.is_empty() {
        println!("{}", "No changes detected.".dimmed());
        return;
    }

    for (file, blocks) in report.iter() {
        println!("{}", file.bold());
        for block in blocks {
            println!("  {}", block.label().cyan());
            if block.affected_functions.is_empty() {
                println!("    {}", "no indexed functions".dimmed());
            }
            for function in &block.affected_functions {
                let name = function.qualified_name();
                println!(
                    "    {} {}",
                    name,
                    format!("({}-{})", function.start_line, function.stop_line).dimmed()
                );
                let calls: Vec<_> = block
                    .affected_calls
                    .iter()
                    .filter(|e| e.source == name)
                    .collect();
                if !calls.is_empty() {
                    println!("      {}", CALLS_TOPIC.yellow());
                    for edge in calls {
                        println!("        {}", edge.destination);
                    }
                }
                let callers: Vec<_> = block
                    .affected_callers
                    .iter()
                    .filter(|e| e.destination == name)
                    .collect();
                if !callers.is_empty() {
                    println!("      {}", CALLERS_TOPIC.yellow());
                    for edge in callers {
                        println!("        {}", edge.source);
                    }
                }
            }
        }
    }

    let summary = report.summary();
    println!();
    println!(
        "{} file(s), {} block(s), {} function(s), {} call(s), {} caller(s)",
        summary.file_count,
        summary.block_count,
        summary.function_count,
        summary.call_count,
        summary.caller_count
    );
}
