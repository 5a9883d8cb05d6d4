use crate::domain::DomainError;

/// Trim an optional field; blank becomes `None`
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed, non-empty, bounded text for required fields such as names
pub fn required(field: &str, value: Option<String>, max_chars: usize) -> Result<String, DomainError> {
    let value = clean(value).ok_or_else(|| DomainError::Validation(format!("{} is required", field)))?;
    bounded(field, value, max_chars)
}

pub fn bounded(field: &str, value: String, max_chars: usize) -> Result<String, DomainError> {
    if value.chars().count() > max_chars {
        return Err(DomainError::Validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_dropped() {
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(Some(" Jazz ".into())), Some("Jazz".into()));
        assert_eq!(clean(None), None);
    }

    #[test]
    fn required_checks_presence_and_length() {
        assert!(required("name", Some(" ".into()), 10).is_err());
        assert!(required("name", Some("x".repeat(11)), 10).is_err());
        assert_eq!(required("name", Some(" Björk ".into()), 10).unwrap(), "Björk");
    }
}
