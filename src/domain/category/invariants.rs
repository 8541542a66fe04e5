use super::entity::Category;
use crate::domain::{DomainError, DomainResult};

/// Validates a category payload before it is stored
pub fn validate_category(category: &Category) -> DomainResult<()> {
    if category.id.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "Category '{}' has an empty id",
            category.name
        )));
    }
    validate_category_name(&category.name)
}

/// Categories are looked up by name, so the name cannot be empty
pub fn validate_category_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Category name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_category() {
        let category = Category {
            id: "1".to_string(),
            name: "Beef".to_string(),
            ..Default::default()
        };
        assert!(validate_category(&category).is_ok());
    }

    #[test]
    fn test_empty_id_or_name_fails() {
        let no_id = Category {
            name: "Beef".to_string(),
            ..Default::default()
        };
        assert!(validate_category(&no_id).is_err());

        let no_name = Category {
            id: "1".to_string(),
            name: "  ".to_string(),
            ..Default::default()
        };
        assert!(validate_category(&no_name).is_err());
    }
}
