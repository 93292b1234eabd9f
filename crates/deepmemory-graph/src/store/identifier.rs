use deepmemory_core::errors::GraphError;

/// Check that a label or relationship type is a plain identifier:
/// ASCII letter or underscore first, then letters, digits, or underscores.
///
/// Query-language backends splice these into statements, so every store
/// rejects anything else up front.
pub fn validate_identifier(value: &str) -> Result<(), GraphError> {
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start {
        return Err(GraphError::InvalidIdentifier {
            value: value.to_string(),
            reason: "must start with an ASCII letter or underscore".to_string(),
        });
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(GraphError::InvalidIdentifier {
            value: value.to_string(),
            reason: format!("contains invalid character {bad:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        for ok in ["Person", "WORKS_ON", "_internal", "Topic2"] {
            validate_identifier(ok).unwrap();
        }
    }

    #[test]
    fn rejects_injection_attempts() {
        for bad in ["", "2Fast", "Person) DETACH DELETE (n", "KNOWS|LIKES", "rel-type"] {
            assert!(validate_identifier(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
