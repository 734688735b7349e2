use serde::Serialize;

/// What one last-level nameserver says about the domain's NS set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub nameserver: String,
    /// NS hosts this server returned, sorted.
    pub references: Vec<String>,
    pub self_reference: bool,
    /// Referenced hosts that reference this server back.
    pub mutual_references: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrossReference {
    pub fn answered(nameserver: String, mut references: Vec<String>) -> Self {
        references.sort();
        references.dedup();
        let self_reference = references.contains(&nameserver);
        Self {
            nameserver,
            references,
            self_reference,
            mutual_references: vec![],
            error: None,
        }
    }

    pub fn failed(nameserver: String, error: String) -> Self {
        Self {
            nameserver,
            references: vec![],
            self_reference: false,
            mutual_references: vec![],
            error: Some(error),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.error.is_some()
    }

    /// Answered, but its own name is missing from what it returned.
    pub fn is_inconsistent(&self) -> bool {
        !self.references.is_empty() && !self.self_reference
    }
}

/// Fills `mutual_references` for every entry from the others' references.
pub fn link_mutual_references(results: &mut [CrossReference]) {
    let snapshot: Vec<(String, Vec<String>)> = results
        .iter()
        .map(|r| (r.nameserver.clone(), r.references.clone()))
        .collect();

    for result in results.iter_mut() {
        result.mutual_references = result
            .references
            .iter()
            .filter(|referenced| {
                snapshot.iter().any(|(ns, refs)| {
                    ns == *referenced && *ns != result.nameserver && refs.contains(&result.nameserver)
                })
            })
            .cloned()
            .collect();
    }
}
