use courier_core::{
    Attributes, CourierConfig, Email, EmailError, EmailSchema, RecordRegistry, ResolveError,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn welcome_email() -> Arc<EmailSchema> {
    Arc::new(
        EmailSchema::named("Notifier::WelcomeEmail")
            .requires(["user_id"])
            .deliver(["user_id"])
            .recipient("address")
            .accessor("address", |_: &Email| Ok(json!("ada@example.com"))),
    )
}

#[test]
fn welcome_payload_matches_declarations() {
    let email = Email::new(welcome_email(), [("user_id", 42)]).unwrap();

    let (template_name, recipient, attributes) = email
        .payload_with(&CourierConfig::default())
        .unwrap()
        .into_parts();
    assert_eq!(template_name, "welcome");
    assert_eq!(recipient, "ada@example.com");
    assert_eq!(
        serde_json::to_string(&attributes).unwrap(),
        r#"{"show_call_to_action":"false","user_id":42}"#
    );
}

#[test]
fn missing_user_id_names_email_and_key() {
    let err = Email::new(welcome_email(), Attributes::new()).unwrap_err();
    assert!(matches!(
        &err,
        EmailError::RequiredAttribute { email, key }
            if email == "Notifier::WelcomeEmail" && key == "user_id"
    ));
}

#[test]
fn required_accessors_return_exact_input_values() {
    let schema = Arc::new(
        EmailSchema::named("Notifier::ReceiptEmail").requires(["order", "total", "lines"]),
    );
    let input = Attributes::from_json(json!({
        "order": { "id": "A-1" },
        "total": 12.5,
        "lines": [1, 2, 3],
        "ignored": null
    }))
    .unwrap();
    let email = Email::new(schema, input.clone()).unwrap();

    for key in ["order", "total", "lines"] {
        assert_eq!(&email.read(key).unwrap(), input.get(key).unwrap());
    }
}

#[test]
fn child_schema_inherits_and_extends_parent() {
    let base = EmailSchema::named("Notifier::AccountEmail")
        .requires(["user_id"])
        .deliver(["user_id"])
        .recipient("address")
        .accessor("address", |_: &Email| Ok(json!("ada@example.com")));
    let child = Arc::new(
        base.subclass("Notifier::PlanChangedEmail")
            .requires(["plan"])
            .deliver(["plan", "user_id"]),
    );
    let base = Arc::new(base);

    assert_eq!(
        child.effective_delivery_keys(),
        ["show_call_to_action", "user_id", "plan"]
    );
    assert!(Email::new(Arc::clone(&base), [("user_id", 1)]).is_ok());

    let err = Email::new(Arc::clone(&child), [("user_id", 1)]).unwrap_err();
    assert!(matches!(err, EmailError::RequiredAttribute { ref key, .. } if key == "plan"));

    let email = Email::new(child, [("user_id", json!(1)), ("plan", json!("pro"))]).unwrap();
    let payload = email.payload_with(&CourierConfig::default()).unwrap();
    assert_eq!(payload.template_name, "plan_changed");
    assert_eq!(
        Value::Object(payload.attributes),
        json!({ "show_call_to_action": "false", "user_id": 1, "plan": "pro" })
    );
}

#[test]
fn subclass_can_override_call_to_action() {
    let schema = Arc::new(
        EmailSchema::named("Notifier::PromoEmail")
            .accessor("show_call_to_action", |_: &Email| Ok(json!("true"))),
    );
    let email = Email::new(schema, Attributes::new()).unwrap();
    assert_eq!(email.delivery_attributes().unwrap()["show_call_to_action"], "true");
}

#[test]
fn relationship_lookup_faults_propagate() {
    let records = RecordRegistry::new().with("User", |id: &Value| {
        Err(ResolveError::NotFound {
            record_type: "User".to_string(),
            id: id.to_string(),
        })
    });
    let schema = Arc::new(
        EmailSchema::named("Notifier::ProfileEmail")
            .belongs_to(["user", "team"])
            .resolver(Arc::new(records))
            .deliver(["user"]),
    );
    let email = Email::new(Arc::clone(&schema), [("user_id", 5), ("team_id", 6)]).unwrap();

    let err = email.delivery_attributes().unwrap_err();
    assert!(matches!(
        err,
        EmailError::Resolution(ResolveError::NotFound { ref id, .. }) if id == "5"
    ));

    let err = email.read("team").unwrap_err();
    assert!(matches!(
        err,
        EmailError::Resolution(ResolveError::UnknownRecordType(ref name)) if name == "Team"
    ));
}

#[test]
fn delivery_block_sees_email_and_keeps_extra_keys() {
    let schema = Arc::new(
        EmailSchema::named("Notifier::DigestEmail")
            .requires(["items"])
            .deliver_with(["items"], |email: &Email, attrs| {
                let count = email
                    .read("items")?
                    .as_array()
                    .map(Vec::len)
                    .unwrap_or_default();
                attrs.insert("item_count".to_string(), json!(count));
                attrs.insert("items".to_string(), json!("placeholder"));
                Ok(())
            }),
    );
    let email = Email::new(schema, [("items", json!(["a", "b"]))]).unwrap();

    let attributes = email.delivery_attributes().unwrap();
    assert_eq!(
        attributes.keys().collect::<Vec<_>>(),
        ["item_count", "items", "show_call_to_action"]
    );
    assert_eq!(attributes["items"], json!(["a", "b"]));
    assert_eq!(attributes["item_count"], 2);
}

#[test]
fn delivery_block_faults_are_not_wrapped() {
    let schema = Arc::new(EmailSchema::named("Notifier::DigestEmail").deliver_with(
        Vec::<String>::new(),
        |_: &Email, _| Err(EmailError::accessor("digest store offline")),
    ));
    let email = Email::new(schema, Attributes::new()).unwrap();

    let err = email.delivery_attributes().unwrap_err();
    assert!(matches!(err, EmailError::Accessor(_)));
    assert_eq!(err.to_string(), "digest store offline");
}
