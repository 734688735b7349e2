//! Rendering of trace reports for the terminal.

use clap::ValueEnum;
use dns_by_eye_domain::{CrossReference, HealthScore, ServerObservation, TraceNode, TraceReport};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Everything printed for one run.
#[derive(Serialize)]
pub struct Rendered<'a> {
    #[serde(flatten)]
    pub report: &'a TraceReport,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_references: Option<&'a [CrossReference]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_score: Option<&'a HealthScore>,
}

impl<'a> Rendered<'a> {
    pub fn new(
        report: &'a TraceReport,
        cross_references: Option<&'a [CrossReference]>,
        health_score: Option<&'a HealthScore>,
    ) -> Self {
        Self {
            report,
            complete: report.is_complete(),
            cross_references,
            health_score,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Per-server lines are only shown when `verbose`.
    pub fn to_text(&self, verbose: bool) -> String {
        let mut out = String::new();
        let report = self.report;

        let _ = writeln!(out, "Delegation chain for {}", report.domain());
        let _ = writeln!(out, "  {}", report.chain().join(" → "));
        let _ = writeln!(out);

        for node in report.trace() {
            write_node(&mut out, node, verbose);
        }

        let timing = report.timing();
        let _ = writeln!(
            out,
            "Total {}ms across {} levels ({} with errors, {} slow)",
            timing.total_ms, timing.levels, timing.error_levels, timing.slow_levels
        );
        match (self.complete, report.terminal_error()) {
            (true, _) => {
                let _ = writeln!(out, "Status: complete");
            }
            (false, Some(kind)) => {
                let _ = writeln!(out, "Status: incomplete ({})", kind);
            }
            (false, None) => {
                let _ = writeln!(out, "Status: incomplete");
            }
        }

        if let Some(cross_references) = self.cross_references {
            let _ = writeln!(out);
            let _ = writeln!(out, "Nameserver cross-references");
            for cross_ref in cross_references {
                write_cross_reference(&mut out, cross_ref);
            }
        }

        if let Some(score) = self.health_score {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Health score: {:.1}/{:.0} ({:.0}%)",
                score.score, score.max_score, score.percentage
            );
            for line in &score.breakdown {
                let _ = writeln!(out, "  {}", line);
            }
        }

        out
    }
}

fn write_node(out: &mut String, node: &TraceNode, verbose: bool) {
    let slow = if node.is_slow { " SLOW" } else { "" };
    let _ = writeln!(out, "[{}] {}ms{}", node.zone, node.response_time_ms, slow);

    if let Some(kind) = node.error_type {
        let _ = writeln!(out, "  error: {}", kind);
    }
    if !node.nameservers.is_empty() {
        let _ = writeln!(out, "  nameservers: {}", node.nameservers.join(", "));
    }
    for glue in node.glue.iter().filter(|g| !g.issues.is_empty()) {
        for issue in &glue.issues {
            let _ = writeln!(out, "  glue: {}: {}", glue.nameserver, issue.describe());
        }
    }
    if verbose {
        for server in &node.servers {
            write_observation(out, "server", server);
        }
        for server in &node.authority {
            write_observation(out, "authority", server);
        }
    }
    let _ = writeln!(out);
}

fn write_observation(out: &mut String, label: &str, server: &ServerObservation) {
    let address = server
        .address
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "no address".to_string());
    let _ = writeln!(
        out,
        "  {}: {} ({}) {:?} {}ms",
        label, server.nameserver, address, server.status, server.elapsed_ms
    );
}

fn write_cross_reference(out: &mut String, cross_ref: &CrossReference) {
    if let Some(error) = &cross_ref.error {
        let _ = writeln!(out, "  {}: error: {}", cross_ref.nameserver, error);
        return;
    }

    let self_ref = if cross_ref.self_reference {
        "lists itself"
    } else {
        "does not list itself"
    };
    let _ = writeln!(
        out,
        "  {}: {} [{}]",
        cross_ref.nameserver,
        self_ref,
        cross_ref.references.join(", ")
    );
    if !cross_ref.mutual_references.is_empty() {
        let _ = writeln!(out, "    mutual: {}", cross_ref.mutual_references.join(", "));
    }
}
