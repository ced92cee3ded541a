pub mod activities;
pub mod calls;
pub mod custom_fields;
pub mod leads;
pub mod notes;
pub mod tasks;

pub use activities::{ActivitiesRepo, ActivityNew};
pub use calls::{CallNew, CallsRepo};
pub use custom_fields::CustomFieldsRepo;
pub use leads::{LeadNew, LeadQuery, LeadUpdate, LeadsRepo};
pub use notes::{NoteNew, NotesRepo};
pub use tasks::{TaskNew, TasksRepo};
