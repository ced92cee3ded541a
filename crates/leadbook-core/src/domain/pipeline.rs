use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a lead came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Import,
    Website,
    Referral,
    Campaign,
    Manual,
    Other(String),
}

impl LeadSource {
    pub fn other(label: &str) -> Result<Self, CoreError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidLeadSource(label.to_string()));
        }
        Ok(Self::Other(trimmed.to_ascii_lowercase()))
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadSource::Import => f.write_str("import"),
            LeadSource::Website => f.write_str("website"),
            LeadSource::Referral => f.write_str("referral"),
            LeadSource::Campaign => f.write_str("campaign"),
            LeadSource::Manual => f.write_str("manual"),
            LeadSource::Other(label) => write!(f, "other:{label}"),
        }
    }
}

impl FromStr for LeadSource {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "import" | "imported" => Ok(LeadSource::Import),
            "website" | "web" => Ok(LeadSource::Website),
            "referral" => Ok(LeadSource::Referral),
            "campaign" => Ok(LeadSource::Campaign),
            "manual" => Ok(LeadSource::Manual),
            "" => Err(CoreError::InvalidLeadSource(raw.to_string())),
            _ => match value.strip_prefix("other:") {
                Some(rest) => LeadSource::other(rest),
                None => LeadSource::other(&value),
            },
        }
    }
}

/// Sales pipeline position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
}

impl LeadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStage::New => "new",
            LeadStage::Contacted => "contacted",
            LeadStage::Qualified => "qualified",
            LeadStage::Proposal => "proposal",
            LeadStage::Won => "won",
            LeadStage::Lost => "lost",
        }
    }
}

impl FromStr for LeadStage {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "new" | "open" => Ok(LeadStage::New),
            "contacted" => Ok(LeadStage::Contacted),
            "qualified" => Ok(LeadStage::Qualified),
            "proposal" | "proposal-sent" | "proposal_sent" => Ok(LeadStage::Proposal),
            "won" | "closed-won" | "closed_won" => Ok(LeadStage::Won),
            "lost" | "closed-lost" | "closed_lost" => Ok(LeadStage::Lost),
            _ => Err(CoreError::InvalidStage(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStatus {
    Pending,
    Scheduled,
    Done,
    NotRequired,
}

impl FollowUpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FollowUpStatus::Pending => "pending",
            FollowUpStatus::Scheduled => "scheduled",
            FollowUpStatus::Done => "done",
            FollowUpStatus::NotRequired => "not_required",
        }
    }
}

impl FromStr for FollowUpStatus {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "pending" => Ok(FollowUpStatus::Pending),
            "scheduled" => Ok(FollowUpStatus::Scheduled),
            "done" | "completed" => Ok(FollowUpStatus::Done),
            "not_required" | "not-required" | "none" => Ok(FollowUpStatus::NotRequired),
            _ => Err(CoreError::InvalidFollowUpStatus(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FollowUpStatus, LeadSource, LeadStage};
    use std::str::FromStr;

    #[test]
    fn lead_source_known_and_other() {
        assert_eq!(LeadSource::from_str(" Web ").unwrap(), LeadSource::Website);
        assert_eq!(
            LeadSource::from_str("Trade Show").unwrap(),
            LeadSource::Other("trade show".to_string())
        );
        assert_eq!(
            LeadSource::from_str("other:expo").unwrap().to_string(),
            "other:expo"
        );
        assert!(LeadSource::from_str("  ").is_err());
    }

    #[test]
    fn stage_parses_aliases() {
        assert_eq!(LeadStage::from_str("Closed-Won").unwrap(), LeadStage::Won);
        assert!(LeadStage::from_str("maybe").is_err());
    }

    #[test]
    fn follow_up_round_trips_labels() {
        for status in [
            FollowUpStatus::Pending,
            FollowUpStatus::Scheduled,
            FollowUpStatus::Done,
            FollowUpStatus::NotRequired,
        ] {
            assert_eq!(FollowUpStatus::from_str(status.as_str()).unwrap(), status);
        }
    }
}
