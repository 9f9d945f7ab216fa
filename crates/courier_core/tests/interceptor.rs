//! Exercises the process-wide configuration; kept in its own test binary so
//! the interceptor never leaks into other tests.

use courier_core::{
    configuration, configure, reset_configuration, Attributes, Email, EmailError, EmailSchema,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn interceptor_address_overrides_every_recipient() {
    let declared = Arc::new(
        EmailSchema::named("Notifier::WelcomeEmail")
            .requires(["user_id"])
            .deliver(["user_id"])
            .recipient("address")
            .accessor("address", |_: &Email| Ok(json!("ada@example.com"))),
    );
    let undeclared = Arc::new(EmailSchema::named("Notifier::SilentEmail"));

    reset_configuration();
    let email = Email::new(Arc::clone(&declared), [("user_id", 42)]).unwrap();
    assert_eq!(email.recipient().unwrap(), "ada@example.com");
    let silent = Email::new(Arc::clone(&undeclared), Attributes::new()).unwrap();
    assert!(matches!(
        silent.recipient().unwrap_err(),
        EmailError::RecipientUndefined { .. }
    ));

    configure(|config| config.interceptor_email = Some("qa@example.com".to_string()));
    assert_eq!(email.recipient().unwrap(), "qa@example.com");
    assert_eq!(silent.recipient().unwrap(), "qa@example.com");
    let payload = email.payload().unwrap();
    assert_eq!(payload.recipient, "qa@example.com");
    assert_eq!(payload.attributes["user_id"], 42);

    configure(|config| config.interceptor_email = Some("  ".to_string()));
    assert_eq!(email.recipient().unwrap(), "ada@example.com");

    reset_configuration();
    assert_eq!(configuration().interceptor_email, None);
}
