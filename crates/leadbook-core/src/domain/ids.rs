use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// First eight hex digits, enough to tell rows apart in listings.
            pub fn short(&self) -> String {
                let mut out = self.0.simple().to_string();
                out.truncate(8);
                out
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

id_type!(LeadId);
id_type!(NoteId);
id_type!(CallId);
id_type!(ActivityId);
id_type!(TaskId);
id_type!(CustomFieldId);

#[cfg(test)]
mod tests {
    use super::LeadId;
    use std::str::FromStr;

    #[test]
    fn short_id_is_prefix_of_simple_form() {
        let id = LeadId::from_str("2d8b83e0-1b7c-4f28-9e1a-1a2d5b1e5e2d").unwrap();
        assert_eq!(id.short(), "2d8b83e0");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(LeadId::from_str("not-a-uuid").is_err());
    }
}
