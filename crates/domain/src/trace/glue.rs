use serde::Serialize;
use std::collections::BTreeSet;
use std::net::IpAddr;

use crate::query_outcome::HostAddress;
use crate::zone::is_in_zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlueIssue {
    /// In-zone nameserver delegated without addresses.
    MissingGlue,
    /// Out-of-zone nameserver delegated with addresses anyway.
    UnnecessaryGlue,
    /// Glue disagrees with what resolving the nameserver returns.
    GlueMismatch,
}

impl GlueIssue {
    pub fn is_major(&self) -> bool {
        matches!(self, GlueIssue::MissingGlue | GlueIssue::GlueMismatch)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            GlueIssue::MissingGlue => "Missing glue records (expected for in-zone nameserver)",
            GlueIssue::UnnecessaryGlue => "Unnecessary glue records (nameserver is out-of-zone)",
            GlueIssue::GlueMismatch => "Glue records don't match resolved addresses",
        }
    }
}

/// Glue the parent zone handed out for one nameserver of a delegated zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlueRecord {
    pub nameserver: String,
    pub expected: bool,
    pub addresses: Vec<IpAddr>,
    pub issues: Vec<GlueIssue>,
}

impl GlueRecord {
    /// Checks every nameserver of `zone` against the glue seen in the referral.
    pub fn analyze(zone: &str, nameservers: &[String], glue: &[HostAddress]) -> Vec<GlueRecord> {
        nameservers
            .iter()
            .map(|ns| {
                let expected = is_in_zone(ns, zone);
                let addresses: Vec<IpAddr> = glue
                    .iter()
                    .filter(|g| &g.host == ns)
                    .map(|g| g.addr)
                    .collect();

                let mut issues = Vec::new();
                if expected && addresses.is_empty() {
                    issues.push(GlueIssue::MissingGlue);
                }
                if !expected && !addresses.is_empty() {
                    issues.push(GlueIssue::UnnecessaryGlue);
                }

                GlueRecord {
                    nameserver: ns.clone(),
                    expected,
                    addresses,
                    issues,
                }
            })
            .collect()
    }

    /// Compares the glue with the addresses `resolved` for the nameserver.
    /// IPv4 and IPv6 are compared separately, and only when both sides have
    /// addresses of that family.
    pub fn check_resolution(&mut self, resolved: &[IpAddr]) {
        let differs = |v4: bool| {
            let glue: BTreeSet<&IpAddr> =
                self.addresses.iter().filter(|a| a.is_ipv4() == v4).collect();
            let found: BTreeSet<&IpAddr> = resolved.iter().filter(|a| a.is_ipv4() == v4).collect();
            !glue.is_empty() && !found.is_empty() && glue != found
        };

        if (differs(true) || differs(false)) && !self.issues.contains(&GlueIssue::GlueMismatch) {
            self.issues.push(GlueIssue::GlueMismatch);
        }
    }
}
