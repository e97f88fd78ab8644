// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::analysis::{AggregateDefectReport, DefectReport};
use crate::obj::ObjRepairSummary;
use crate::repair::{RepairOutcome, RepairStep};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report the analysis of every mesh in a file
    pub fn report_analysis(file: &str, report: &AggregateDefectReport) {
        Self::header("Analyzed:", file);

        for mesh in &report.meshes {
            println!("\n{} {}", "Mesh:".bold(), mesh.name.cyan());
            Self::print_report(&mesh.report);
        }

        if report.mesh_count > 1 {
            println!("\n{}", "Total:".bold());
            Self::print_count("Vertices", report.vertex_count, false);
            Self::print_count("Faces", report.face_count, false);
            Self::print_count("Boundary edges", report.boundary_edge_count, false);
            Self::print_count("Issues", report.total_issues, true);
        }

        println!();
        Self::verdict(report.is_clean());
        Self::footer();
    }

    /// Report a buffer-engine repair run
    pub fn report_repair(file: &str, outcome: &RepairOutcome, duration: Duration) {
        Self::header("Repaired:", file);

        println!("\n{}", "Operations:".bold());
        for step in RepairStep::ORDER {
            Self::print_count(step.name(), outcome.operations.get(step), false);
        }

        if let Some(convergence) = &outcome.convergence {
            let state = if convergence.converged {
                "converged".green()
            } else {
                "not converged".yellow()
            };
            println!(
                "\n{} {} after {} iteration(s)",
                "Ensure manifold:".bold(),
                state,
                convergence.iterations
            );
        }

        println!("\n{}", "Result:".bold());
        Self::print_count("Vertices", outcome.final_report.vertex_count, false);
        Self::print_count("Faces", outcome.final_report.face_count, false);
        Self::print_count("Issues", outcome.final_report.total_issues, true);
        Self::print_time(duration);

        println!();
        Self::verdict(outcome.is_manifold_ready());
        Self::footer();
    }

    /// Report an OBJ-engine repair run
    pub fn report_obj_repair(file: &str, summary: &ObjRepairSummary, duration: Duration) {
        Self::header("Repaired:", file);

        println!("\n{}", "Operations:".bold());
        Self::print_count("merged vertices", summary.merged_vertices, false);
        Self::print_count("degenerate faces", summary.degenerate_faces_removed, false);
        Self::print_count("non-manifold faces", summary.non_manifold_faces_removed, false);
        Self::print_count("loose vertices", summary.loose_vertices_removed, false);

        println!(
            "\n{} {} -> {}",
            "Issues:".bold(),
            summary.before.issue_count().to_string().yellow(),
            Self::colored_count(summary.after.issue_count(), true)
        );
        Self::print_time(duration);

        println!();
        Self::verdict(summary.after.issue_count() == 0);
        Self::footer();
    }

    /// Summarize a batch run
    pub fn report_batch(clean: usize, dirty: usize, failed: usize, duration: Duration) {
        Self::header("Batch:", &format!("{} file(s)", clean + dirty + failed));
        Self::print_count("Manifold", clean, false);
        Self::print_count("With issues", dirty, true);
        Self::print_count("Failed", failed, true);
        Self::print_time(duration);
        Self::footer();
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_report(report: &DefectReport) {
        Self::print_count("Vertices", report.vertex_count, false);
        Self::print_count("Faces", report.face_count, false);
        Self::print_count("Duplicate vertices", report.duplicate_vertex_count, true);
        Self::print_count("Loose vertices", report.loose_vertex_count, true);
        Self::print_count("Non-manifold edges", report.non_manifold_edge_count, true);
        Self::print_count("Non-manifold vertices", report.non_manifold_vertex_count, true);
        Self::print_count("Degenerate faces", report.degenerate_face_count, true);
        Self::print_count("Boundary edges", report.boundary_edge_count, false);
    }

    fn header(label: &str, subject: &str) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", label.bold(), subject.cyan());
        println!("{}", "━".repeat(80).bright_black());
    }

    fn footer() {
        println!("{}", "━".repeat(80).bright_black());
    }

    fn verdict(clean: bool) {
        if clean {
            println!("{} {}", "✅".green(), "Mesh is manifold".green().bold());
        } else {
            println!("{} {}", "❌".red(), "Mesh has defects".red().bold());
        }
    }

    /// Defect counts are green at zero and red otherwise; plain counts are cyan
    fn colored_count(count: usize, is_defect: bool) -> ColoredString {
        let text = count.to_string();
        match (is_defect, count) {
            (false, _) => text.cyan(),
            (true, 0) => text.green(),
            (true, _) => text.red(),
        }
    }

    fn print_count(name: &str, count: usize, is_defect: bool) {
        println!(
            "  {:<24} {}",
            format!("{}:", name).bright_black(),
            Self::colored_count(count, is_defect)
        );
    }

    fn print_time(duration: Duration) {
        println!(
            "  {:<24} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
