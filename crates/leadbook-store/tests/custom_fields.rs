use leadbook_core::domain::{FollowUpStatus, LeadSource, LeadStage};
use leadbook_store::error::StoreErrorKind;
use leadbook_store::repo::LeadNew;
use leadbook_store::Store;

fn new_lead(email: &str) -> LeadNew {
    LeadNew {
        name: "Ada".to_string(),
        email: email.to_string(),
        phone: None,
        company: None,
        source: LeadSource::Import,
        stage: LeadStage::New,
        follow_up: FollowUpStatus::Pending,
        notes: None,
    }
}

#[test]
fn define_set_and_clear_values() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    let now = 1_700_000_000;

    let field = store
        .custom_fields()
        .create(now, "Budget Range", None)
        .expect("create field");
    assert_eq!(field.key, "budget_range");
    assert_eq!(field.label, "Budget Range");

    let dup = store
        .custom_fields()
        .create(now, "budget-range", None)
        .unwrap_err();
    assert_eq!(dup.kind(), StoreErrorKind::DuplicateCustomField);

    let lead = store
        .leads()
        .create(now, new_lead("ada@example.com"))
        .expect("create lead");
    store
        .custom_fields()
        .set_value(lead.id, "Budget Range", " 10k ")
        .expect("set value");
    store
        .custom_fields()
        .set_value(lead.id, "budget_range", "20k")
        .expect("overwrite value");

    let values = store
        .custom_fields()
        .values_for_lead(lead.id)
        .expect("values");
    assert_eq!(values.get("budget_range").map(String::as_str), Some("20k"));

    store
        .custom_fields()
        .set_value(lead.id, "budget_range", "")
        .expect("clear value");
    assert!(store
        .custom_fields()
        .values_for_lead(lead.id)
        .expect("values")
        .is_empty());

    let unknown = store
        .custom_fields()
        .set_value(lead.id, "region", "emea")
        .unwrap_err();
    assert_eq!(unknown.kind(), StoreErrorKind::UnknownCustomField);
}

#[test]
fn create_with_custom_values_is_atomic() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    let now = 1_700_000_000;
    store
        .custom_fields()
        .create(now, "Region", None)
        .expect("create field");

    let err = store
        .leads()
        .create_with_custom_values(
            now,
            new_lead("ada@example.com"),
            &[
                ("region".to_string(), "emea".to_string()),
                ("missing".to_string(), "x".to_string()),
            ],
        )
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::UnknownCustomField);
    assert_eq!(store.leads().count().expect("count"), 0);

    let lead = store
        .leads()
        .create_with_custom_values(
            now,
            new_lead("ada@example.com"),
            &[("region".to_string(), "emea".to_string())],
        )
        .expect("create with values");
    let values = store
        .custom_fields()
        .values_for_lead(lead.id)
        .expect("values");
    assert_eq!(values.get("region").map(String::as_str), Some("emea"));

    store.custom_fields().delete("Region").expect("delete field");
    assert!(store
        .custom_fields()
        .values_for_lead(lead.id)
        .expect("values")
        .is_empty());
    let missing = store.custom_fields().delete("region").unwrap_err();
    assert_eq!(missing.kind(), StoreErrorKind::NotFound);
}
