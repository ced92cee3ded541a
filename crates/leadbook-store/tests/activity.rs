use leadbook_core::domain::{ActivityKind, CallOutcome, FollowUpStatus, LeadSource, LeadStage};
use leadbook_core::{merge_timeline, TimelineSource};
use leadbook_store::error::StoreErrorKind;
use leadbook_store::repo::{ActivityNew, CallNew, LeadNew, NoteNew, TaskNew};
use leadbook_store::Store;

fn store_with_lead() -> (Store, leadbook_core::domain::LeadId) {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    let lead = store
        .leads()
        .create(
            1_700_000_000,
            LeadNew {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                company: None,
                source: LeadSource::Import,
                stage: LeadStage::New,
                follow_up: FollowUpStatus::Pending,
                notes: None,
            },
        )
        .expect("create lead");
    (store, lead.id)
}

#[test]
fn timeline_merges_all_three_sources_newest_first() {
    let (store, lead_id) = store_with_lead();

    store
        .notes()
        .add(
            100,
            NoteNew {
                lead_id,
                author: Some("sam".to_string()),
                body: "Met at the fair".to_string(),
            },
        )
        .expect("add note");
    store
        .calls()
        .add(CallNew {
            lead_id,
            author: None,
            started_at: 300,
            duration_secs: 200,
            outcome: CallOutcome::Answered,
            summary: "wants a demo".to_string(),
        })
        .expect("add call");
    store
        .activities()
        .add(ActivityNew {
            lead_id,
            kind: ActivityKind::Whatsapp,
            occurred_at: 200,
            created_at: 200,
            author: None,
            content: "sent brochure".to_string(),
        })
        .expect("add activity");

    let feed = merge_timeline(
        &store.activities().list_for_lead(lead_id).expect("activities"),
        &store.notes().list_for_lead(lead_id).expect("notes"),
        &store.calls().list_for_lead(lead_id).expect("calls"),
    );
    let order: Vec<_> = feed.iter().map(|entry| (entry.occurred_at, entry.source)).collect();
    assert_eq!(
        order,
        vec![
            (300, TimelineSource::Call),
            (200, TimelineSource::Activity),
            (100, TimelineSource::Note),
        ]
    );
}

#[test]
fn rejects_blank_note_and_negative_call_duration() {
    let (store, lead_id) = store_with_lead();

    let note = store
        .notes()
        .add(
            1,
            NoteNew {
                lead_id,
                author: None,
                body: "   ".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(note.kind(), StoreErrorKind::Core);

    let call = store
        .calls()
        .add(CallNew {
            lead_id,
            author: None,
            started_at: 1,
            duration_secs: -5,
            outcome: CallOutcome::Busy,
            summary: String::new(),
        })
        .unwrap_err();
    assert_eq!(call.kind(), StoreErrorKind::Core);
}

#[test]
fn child_rows_require_an_existing_lead() {
    let (store, _) = store_with_lead();
    let stranger = leadbook_core::domain::LeadId::new();

    let err = store
        .notes()
        .add(
            1,
            NoteNew {
                lead_id: stranger,
                author: None,
                body: "hello".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[test]
fn tasks_log_creation_and_completion_once() {
    let (store, lead_id) = store_with_lead();

    let later = store
        .tasks()
        .create(
            10,
            TaskNew {
                lead_id,
                title: "Send pricing".to_string(),
                due_at: Some(5_000),
            },
            None,
        )
        .expect("create task");
    let sooner = store
        .tasks()
        .create(
            11,
            TaskNew {
                lead_id,
                title: "Call back".to_string(),
                due_at: Some(1_000),
            },
            None,
        )
        .expect("create task");

    let done = store.tasks().complete(20, later.id, Some("sam")).expect("complete");
    assert_eq!(done.completed_at, Some(20));
    let again = store.tasks().complete(30, later.id, None).expect("complete again");
    assert_eq!(again.completed_at, Some(20));

    let tasks = store.tasks().list_for_lead(lead_id).expect("list tasks");
    let ids: Vec<_> = tasks.iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);
    assert_eq!(store.tasks().list_open_for_lead(lead_id).expect("open").len(), 1);

    let kinds: Vec<_> = store
        .activities()
        .list_for_lead(lead_id)
        .expect("activities")
        .into_iter()
        .map(|activity| activity.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ActivityKind::TaskCompleted,
            ActivityKind::TaskCreated,
            ActivityKind::TaskCreated,
        ]
    );

    let blank = store
        .tasks()
        .create(
            40,
            TaskNew {
                lead_id,
                title: " ".to_string(),
                due_at: None,
            },
            None,
        )
        .unwrap_err();
    assert_eq!(blank.kind(), StoreErrorKind::Core);
}

#[test]
fn deleting_a_lead_cascades_to_its_history() {
    let (store, lead_id) = store_with_lead();
    store
        .notes()
        .add(
            1,
            NoteNew {
                lead_id,
                author: None,
                body: "hello".to_string(),
            },
        )
        .expect("add note");

    store.leads().delete(lead_id).expect("delete lead");
    assert!(store.notes().list_for_lead(lead_id).expect("notes").is_empty());
}
