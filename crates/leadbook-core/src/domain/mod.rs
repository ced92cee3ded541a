pub mod activity;
pub mod custom_field;
pub mod duplicate;
pub mod email;
pub mod field;
pub mod ids;
pub mod lead;
pub mod phone;
pub mod pipeline;
pub mod task;

pub use activity::{Activity, ActivityKind, CallLog, CallOutcome, Note};
pub use custom_field::{normalize_field_key, CustomField, CustomFieldValue};
pub use duplicate::DuplicatePolicy;
pub use email::{is_plausible_email, normalize_email};
pub use field::CrmField;
pub use ids::{ActivityId, CallId, CustomFieldId, LeadId, NoteId, TaskId};
pub use lead::{validate_lead_fields, Lead};
pub use phone::normalize_phone_for_match;
pub use pipeline::{FollowUpStatus, LeadSource, LeadStage};
pub use task::Task;
