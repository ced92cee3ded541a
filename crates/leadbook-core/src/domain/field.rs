use serde::{Deserialize, Serialize};

/// Built-in lead attributes an imported column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmField {
    Name,
    Email,
    Phone,
    Company,
    Source,
    Stage,
    FollowUpStatus,
    Notes,
}

impl CrmField {
    pub const REQUIRED: &'static [CrmField] = &[CrmField::Name, CrmField::Email];

    pub const fn as_str(self) -> &'static str {
        match self {
            CrmField::Name => "name",
            CrmField::Email => "email",
            CrmField::Phone => "phone",
            CrmField::Company => "company",
            CrmField::Source => "source",
            CrmField::Stage => "stage",
            CrmField::FollowUpStatus => "follow_up_status",
            CrmField::Notes => "notes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Some(CrmField::Name),
            "email" => Some(CrmField::Email),
            "phone" => Some(CrmField::Phone),
            "company" => Some(CrmField::Company),
            "source" => Some(CrmField::Source),
            "stage" => Some(CrmField::Stage),
            "follow_up_status" | "follow-up" | "follow_up" => Some(CrmField::FollowUpStatus),
            "notes" | "note" => Some(CrmField::Notes),
            _ => None,
        }
    }

    pub const fn is_required(self) -> bool {
        matches!(self, CrmField::Name | CrmField::Email)
    }

    pub const fn all() -> &'static [CrmField] {
        &[
            CrmField::Name,
            CrmField::Email,
            CrmField::Phone,
            CrmField::Company,
            CrmField::Source,
            CrmField::Stage,
            CrmField::FollowUpStatus,
            CrmField::Notes,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::CrmField;

    #[test]
    fn parse_accepts_every_label() {
        for field in CrmField::all() {
            assert_eq!(CrmField::parse(field.as_str()), Some(*field));
        }
    }

    #[test]
    fn required_fields_are_name_and_email() {
        let required: Vec<_> = CrmField::all()
            .iter()
            .copied()
            .filter(|field| field.is_required())
            .collect();
        assert_eq!(required, CrmField::REQUIRED);
    }
}
