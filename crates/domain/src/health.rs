//! Delegation health score out of 10.
//!
//! Layers are weighted root 1, TLD 1, deeper 3; glue is worth 3 and
//! nameserver cross-references 2.

use serde::Serialize;

use crate::cross_reference::CrossReference;
use crate::trace::TraceNode;

const ROOT_WEIGHT: f64 = 1.0;
const TLD_WEIGHT: f64 = 1.0;
const DOMAIN_WEIGHT: f64 = 3.0;
const GLUE_WEIGHT: f64 = 3.0;
const CROSS_REF_WEIGHT: f64 = 2.0;
const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthScore {
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub breakdown: Vec<String>,
}

impl HealthScore {
    pub fn calculate(trace: &[TraceNode], cross_refs: Option<&[CrossReference]>) -> Self {
        let mut score = 0.0;
        let mut breakdown = Vec::new();

        for (i, node) in trace.iter().enumerate() {
            let weight = match i {
                0 => ROOT_WEIGHT,
                1 => TLD_WEIGHT,
                _ => DOMAIN_WEIGHT,
            };
            let layer = i + 1;

            if node.has_error() {
                breakdown.push(format!("+0 points: Layer {} ({}) has errors", layer, node.zone));
            } else {
                score += 0.7 * weight;
                breakdown.push(format!(
                    "+{} points: Layer {} ({}) is healthy",
                    round1(0.7 * weight),
                    layer,
                    node.zone
                ));
            }

            if node.is_slow {
                breakdown.push(format!(
                    "+0 points: Layer {} ({}) has slow response",
                    layer, node.zone
                ));
            } else {
                score += 0.3 * weight;
                breakdown.push(format!(
                    "+{} points: Layer {} ({}) has good response time",
                    round1(0.3 * weight),
                    layer,
                    node.zone
                ));
            }
        }

        score += glue_points(trace, &mut breakdown);

        if let Some(cross_refs) = cross_refs {
            score += cross_ref_points(cross_refs, &mut breakdown);
        }

        let score = round1(score).min(MAX_SCORE);
        Self {
            score,
            max_score: MAX_SCORE,
            percentage: score / MAX_SCORE * 100.0,
            breakdown,
        }
    }
}

fn glue_points(trace: &[TraceNode], breakdown: &mut Vec<String>) -> f64 {
    let issues = trace
        .iter()
        .flat_map(|node| node.glue.iter())
        .flat_map(|record| record.issues.iter());

    let (mut major, mut minor) = (0usize, 0usize);
    for issue in issues {
        if issue.is_major() {
            major += 1;
        } else {
            minor += 1;
        }
    }

    if major + minor == 0 {
        breakdown.push(format!("+{} points: All glue records are correct", GLUE_WEIGHT));
        return GLUE_WEIGHT;
    }

    if major > 0 {
        breakdown.push(format!(
            "-{} points: {} major glue {} found",
            round1(major as f64),
            major,
            plural(major, "issue", "issues")
        ));
    }
    if minor > 0 {
        breakdown.push(format!(
            "-{} points: {} minor glue {} found",
            round1(minor as f64 * 0.25),
            minor,
            plural(minor, "issue", "issues")
        ));
    }

    (GLUE_WEIGHT - (major as f64 + minor as f64 * 0.25)).max(0.0)
}

fn cross_ref_points(cross_refs: &[CrossReference], breakdown: &mut Vec<String>) -> f64 {
    let broken: Vec<&CrossReference> = cross_refs.iter().filter(|r| r.is_broken()).collect();
    let inconsistent = cross_refs.iter().filter(|r| r.is_inconsistent()).count();

    if broken.is_empty() && inconsistent == 0 {
        breakdown.push(format!(
            "+{} points: All nameserver references are consistent",
            CROSS_REF_WEIGHT
        ));
        return CROSS_REF_WEIGHT;
    }

    if !broken.is_empty() {
        breakdown.push(format!(
            "-{} points: {} broken {} found",
            round1(broken.len() as f64),
            broken.len(),
            plural(broken.len(), "nameserver", "nameservers")
        ));
        for entry in broken.iter().take(3) {
            breakdown.push(format!(
                "  • {}: {}",
                entry.nameserver,
                entry.error.as_deref().unwrap_or("unknown error")
            ));
        }
        if broken.len() > 3 {
            breakdown.push(format!("  • ... and {} more", broken.len() - 3));
        }
    }
    if inconsistent > 0 {
        breakdown.push(format!(
            "-{} points: {} inconsistent nameserver {} found",
            round1(inconsistent as f64 * 0.25),
            inconsistent,
            plural(inconsistent, "reference", "references")
        ));
    }

    (CROSS_REF_WEIGHT - (broken.len() as f64 + inconsistent as f64 * 0.25)).max(0.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{ErrorKind, GlueIssue, GlueRecord};
    use chrono::Utc;

    fn node(zone: &str, error_type: Option<ErrorKind>, is_slow: bool) -> TraceNode {
        TraceNode {
            zone: zone.to_string(),
            nameservers: vec![],
            response_time_ms: 20,
            error_type,
            is_slow,
            queried_at: Utc::now(),
            servers: vec![],
            authority: vec![],
            glue: vec![],
        }
    }

    #[test]
    fn test_perfect_trace_scores_ten() {
        let trace = vec![node(".", None, false), node("com", None, false), node("example.com", None, false)];
        let refs = vec![CrossReference::answered(
            "ns1.example.com".to_string(),
            vec!["ns1.example.com".to_string()],
        )];
        let health = HealthScore::calculate(&trace, Some(&refs));
        assert_eq!(health.score, 10.0);
        assert_eq!(health.percentage, 100.0);
    }

    #[test]
    fn test_error_and_slow_layers_lose_points() {
        let trace = vec![
            node(".", None, false),
            node("com", None, true),
            node("example.com", Some(ErrorKind::NameError), false),
        ];
        let health = HealthScore::calculate(&trace, None);
        // 1 + 0.7 + 0.9 + 3 (glue)
        assert_eq!(health.score, 5.6);
        assert!(health
            .breakdown
            .iter()
            .any(|line| line.contains("Layer 3 (example.com) has errors")));
    }

    #[test]
    fn test_glue_issues_deduct() {
        let mut domain = node("example.com", None, false);
        domain.glue = vec![
            GlueRecord {
                nameserver: "ns1.example.com".to_string(),
                expected: true,
                addresses: vec![],
                issues: vec![GlueIssue::MissingGlue],
            },
            GlueRecord {
                nameserver: "ns.other.net".to_string(),
                expected: false,
                addresses: vec!["192.0.2.1".parse().unwrap()],
                issues: vec![GlueIssue::UnnecessaryGlue],
            },
            GlueRecord {
                nameserver: "ns.third.org".to_string(),
                expected: false,
                addresses: vec!["192.0.2.2".parse().unwrap()],
                issues: vec![GlueIssue::UnnecessaryGlue],
            },
        ];
        let trace = vec![node(".", None, false), node("com", None, false), domain];
        let health = HealthScore::calculate(&trace, None);
        // 5 for layers, 3 - 1 - 0.5 for glue
        assert_eq!(health.score, 6.5);
        assert!(health.breakdown.iter().any(|l| l.contains("2 minor glue issues found")));
    }

    #[test]
    fn test_glue_mismatch_is_major() {
        let mut domain = node("example.com", None, false);
        domain.glue = vec![GlueRecord {
            nameserver: "ns1.example.com".to_string(),
            expected: true,
            addresses: vec!["192.0.2.1".parse().unwrap()],
            issues: vec![GlueIssue::GlueMismatch],
        }];
        let trace = vec![node(".", None, false), node("com", None, false), domain];
        let health = HealthScore::calculate(&trace, None);
        assert_eq!(health.score, 7.0);
        assert!(health.breakdown.iter().any(|l| l.contains("1 major glue issue found")));
    }

    #[test]
    fn test_broken_nameservers_deduct() {
        let trace = vec![node(".", None, false), node("com", None, false), node("example.com", None, false)];
        let refs = vec![
            CrossReference::failed("ns1.example.com".to_string(), "timeout".to_string()),
            CrossReference::answered("ns2.example.com".to_string(), vec!["ns2.example.com".to_string()]),
        ];
        let health = HealthScore::calculate(&trace, Some(&refs));
        // 8 + (2 - 1)
        assert_eq!(health.score, 9.0);
        assert!(health.breakdown.iter().any(|l| l.contains("1 broken nameserver found")));
    }
}
