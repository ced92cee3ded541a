use crate::domain::email::is_plausible_email;
use crate::domain::ids::LeadId;
use crate::domain::phone::normalize_phone_for_match;
use crate::domain::pipeline::{FollowUpStatus, LeadSource, LeadStage};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: LeadSource,
    pub stage: LeadStage,
    pub follow_up: FollowUpStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Lead {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_lead_fields(&self.name, &self.email, self.phone.as_deref())
    }
}

/// Checks shared by manual entry and imported rows.
pub fn validate_lead_fields(name: &str, email: &str, phone: Option<&str>) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::EmptyName);
    }
    if email.trim().is_empty() {
        return Err(CoreError::MissingEmail);
    }
    if !is_plausible_email(email) {
        return Err(CoreError::InvalidEmail(email.trim().to_string()));
    }
    if let Some(phone) = phone {
        if normalize_phone_for_match(phone).is_none() {
            return Err(CoreError::InvalidPhone(phone.trim().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_lead_fields;
    use crate::error::CoreError;

    #[test]
    fn rejects_blank_name() {
        assert_eq!(
            validate_lead_fields(" ", "a@b.com", None),
            Err(CoreError::EmptyName)
        );
    }

    #[test]
    fn rejects_missing_or_broken_email() {
        assert_eq!(
            validate_lead_fields("Ada", "", None),
            Err(CoreError::MissingEmail)
        );
        assert!(matches!(
            validate_lead_fields("Ada", "ada-at-example", None),
            Err(CoreError::InvalidEmail(_))
        ));
    }

    #[test]
    fn rejects_phone_without_digits() {
        assert!(matches!(
            validate_lead_fields("Ada", "ada@example.com", Some("unknown")),
            Err(CoreError::InvalidPhone(_))
        ));
        assert!(validate_lead_fields("Ada", "ada@example.com", Some("+1 555 0101")).is_ok());
    }
}
