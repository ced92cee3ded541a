use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What an import does with a row whose email already belongs to a lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Skip,
    Update,
}

impl DuplicatePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            DuplicatePolicy::Skip => "skip",
            DuplicatePolicy::Update => "update",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(DuplicatePolicy::Skip),
            "update" => Ok(DuplicatePolicy::Update),
            other => Err(format!("invalid duplicate policy: {other}")),
        }
    }
}
