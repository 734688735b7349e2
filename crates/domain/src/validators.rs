use crate::errors::DomainError;

pub const MAX_DOMAIN_LENGTH: usize = 253;
pub const MAX_LABEL_LENGTH: usize = 63;

/// Checks that `domain` is a syntactically valid tracer target.
///
/// A single trailing dot is accepted. Bare TLDs and single labels are
/// rejected: the walk needs at least one delegation below a TLD.
pub fn is_valid_domain(domain: &str) -> bool {
    validate_domain(domain).is_ok()
}

/// Validates `domain` and returns it lowercased without the trailing dot.
pub fn validate_domain(domain: &str) -> Result<String, DomainError> {
    let name = domain.strip_suffix('.').unwrap_or(domain);

    if name.is_empty() {
        return Err(DomainError::InvalidDomainName(
            "domain cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_DOMAIN_LENGTH {
        return Err(DomainError::InvalidDomainName(format!(
            "domain exceeds {} characters",
            MAX_DOMAIN_LENGTH
        )));
    }

    let mut labels = 0usize;
    for label in name.split('.') {
        validate_label(label).map_err(|reason| {
            DomainError::InvalidDomainName(format!("{}: {}", domain, reason))
        })?;
        labels += 1;
    }

    if labels < 2 {
        return Err(DomainError::InvalidDomainName(format!(
            "{}: at least two labels are required",
            domain
        )));
    }

    Ok(name.to_ascii_lowercase())
}

fn validate_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("empty label".to_string());
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(format!("label '{}' exceeds {} characters", label, MAX_LABEL_LENGTH));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("label '{}' starts or ends with a hyphen", label));
    }
    if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(format!("label '{}' contains invalid characters", label));
    }
    Ok(())
}
