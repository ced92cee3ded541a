use crate::domain::{Activity, ActivityKind, CallLog, Note};
use crate::time::format_duration_secs;
use serde::{Deserialize, Serialize};

/// Which stored collection a timeline entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSource {
    Activity,
    Note,
    Call,
}

impl TimelineSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            TimelineSource::Activity => "activity",
            TimelineSource::Note => "note",
            TimelineSource::Call => "call",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// `<source>:<id>`; unique even when ids collide across sources.
    pub key: String,
    pub source: TimelineSource,
    pub kind: ActivityKind,
    pub occurred_at: i64,
    pub author: Option<String>,
    pub content: String,
}

/// Folds the three per-lead collections into one feed, newest first.
/// Entries sharing a timestamp are ordered by key.
pub fn merge_timeline(
    activities: &[Activity],
    notes: &[Note],
    calls: &[CallLog],
) -> Vec<TimelineEntry> {
    let mut entries = Vec::with_capacity(activities.len() + notes.len() + calls.len());

    for activity in activities {
        entries.push(TimelineEntry {
            key: entry_key(TimelineSource::Activity, &activity.id.to_string()),
            source: TimelineSource::Activity,
            kind: activity.kind.clone(),
            occurred_at: activity.occurred_at,
            author: activity.author.clone(),
            content: activity.content.clone(),
        });
    }

    for note in notes {
        entries.push(TimelineEntry {
            key: entry_key(TimelineSource::Note, &note.id.to_string()),
            source: TimelineSource::Note,
            kind: ActivityKind::Note,
            occurred_at: note.created_at,
            author: note.author.clone(),
            content: note.body.clone(),
        });
    }

    for call in calls {
        entries.push(TimelineEntry {
            key: entry_key(TimelineSource::Call, &call.id.to_string()),
            source: TimelineSource::Call,
            kind: ActivityKind::Call,
            occurred_at: call.started_at,
            author: call.author.clone(),
            content: render_call(call),
        });
    }

    entries.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| a.key.cmp(&b.key))
    });
    entries
}

fn entry_key(source: TimelineSource, id: &str) -> String {
    format!("{}:{}", source.as_str(), id)
}

fn render_call(call: &CallLog) -> String {
    let header = format!(
        "{} call, {}",
        call.outcome.as_str().replace('_', " "),
        format_duration_secs(call.duration_secs)
    );
    let summary = call.summary.trim();
    if summary.is_empty() {
        header
    } else {
        format!("{header}: {summary}")
    }
}

#[cfg(test)]
mod tests {
    use super::{merge_timeline, TimelineSource};
    use crate::domain::{
        Activity, ActivityId, ActivityKind, CallId, CallLog, CallOutcome, LeadId, Note, NoteId,
    };
    use std::collections::HashSet;
    use uuid::Uuid;

    fn note(lead_id: LeadId, at: i64, body: &str) -> Note {
        Note {
            id: NoteId::new(),
            lead_id,
            author: Some("sam".to_string()),
            body: body.to_string(),
            created_at: at,
        }
    }

    fn call(lead_id: LeadId, at: i64) -> CallLog {
        CallLog {
            id: CallId::new(),
            lead_id,
            author: None,
            started_at: at,
            duration_secs: 200,
            outcome: CallOutcome::NoAnswer,
            summary: String::new(),
        }
    }

    fn activity(lead_id: LeadId, at: i64, kind: ActivityKind) -> Activity {
        Activity {
            id: ActivityId::new(),
            lead_id,
            kind,
            occurred_at: at,
            created_at: at,
            author: None,
            content: "stage: new -> contacted".to_string(),
        }
    }

    #[test]
    fn orders_newest_first_across_sources() {
        let lead = LeadId::new();
        let merged = merge_timeline(
            &[activity(lead, 300, ActivityKind::FieldUpdate)],
            &[note(lead, 100, "first")],
            &[call(lead, 200)],
        );
        let times: Vec<i64> = merged.iter().map(|entry| entry.occurred_at).collect();
        assert_eq!(times, vec![300, 200, 100]);
        assert_eq!(merged[0].source, TimelineSource::Activity);
        assert_eq!(merged[1].kind, ActivityKind::Call);
        assert_eq!(merged[1].content, "no answer call, 3m 20s");
        assert_eq!(merged[2].content, "first");
    }

    #[test]
    fn keys_stay_unique_when_ids_collide() {
        let lead = LeadId::new();
        let shared = Uuid::new_v4();
        let mut n = note(lead, 50, "same id");
        n.id = NoteId::from_uuid(shared);
        let mut c = call(lead, 50);
        c.id = CallId::from_uuid(shared);

        let merged = merge_timeline(&[], &[n], &[c]);
        let keys: HashSet<&str> = merged.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys.len(), 2);
        assert!(merged[0].key.starts_with("call:"));
        assert!(merged[1].key.starts_with("note:"));
    }

    #[test]
    fn empty_inputs_give_empty_feed() {
        assert!(merge_timeline(&[], &[], &[]).is_empty());
    }
}
