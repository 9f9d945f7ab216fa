//! Email type registry.
//!
//! # Responsibility
//! - Map declared type names (`Notifier::WelcomeEmail`) to their schemas.
//! - Resolve an external `email_name` back to its schema without reflection.
//!
//! # Invariants
//! - Only named schemas can be registered; type names are unique.
//! - `resolve_by_email_name(schema.email_name())` returns `schema` for every
//!   registered `Notifier::*Email` type whose name survives the naming round trip.

use crate::attributes::Attributes;
use crate::email::Email;
use crate::error::EmailError;
use crate::naming::email_type_name_for;
use crate::schema::EmailSchema;
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registration and lookup errors.
#[derive(Debug)]
pub enum RegistryError {
    AnonymousEmail,
    DuplicateEmail(String),
    UnknownEmailName(String),
    Email(EmailError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AnonymousEmail => write!(f, "anonymous email schemas cannot be registered"),
            Self::DuplicateEmail(value) => write!(f, "email type already registered: {value}"),
            Self::UnknownEmailName(value) => write!(f, "unknown email name: {value}"),
            Self::Email(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Email(err) => Some(err),
            Self::AnonymousEmail | Self::DuplicateEmail(_) | Self::UnknownEmailName(_) => None,
        }
    }
}

impl From<EmailError> for RegistryError {
    fn from(value: EmailError) -> Self {
        Self::Email(value)
    }
}

/// In-process registry of declared email types.
#[derive(Debug, Default)]
pub struct EmailRegistry {
    schemas: BTreeMap<String, Arc<EmailSchema>>,
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one named schema and returns the shared handle.
    pub fn register(&mut self, schema: EmailSchema) -> Result<Arc<EmailSchema>, RegistryError> {
        let Some(type_name) = schema.type_name().map(str::to_string) else {
            return Err(RegistryError::AnonymousEmail);
        };
        if self.schemas.contains_key(type_name.as_str()) {
            return Err(RegistryError::DuplicateEmail(type_name));
        }

        let schema = Arc::new(schema);
        debug!(
            "event=email_register module=registry status=ok type_name={} email={}",
            type_name,
            schema.email_name()
        );
        self.schemas.insert(type_name, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns sorted registered type names.
    pub fn type_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<EmailSchema>> {
        self.schemas.get(type_name).cloned()
    }

    /// Resolves `welcome` to the schema registered as `Notifier::WelcomeEmail`.
    pub fn resolve_by_email_name(&self, email_name: &str) -> Result<Arc<EmailSchema>, RegistryError> {
        let type_name = email_type_name_for(email_name);
        self.get(&type_name)
            .ok_or_else(|| RegistryError::UnknownEmailName(email_name.to_string()))
    }

    /// Resolves an email name and builds an email from the input.
    pub fn build(
        &self,
        email_name: &str,
        attributes: impl Into<Attributes>,
    ) -> Result<Email, RegistryError> {
        let schema = self.resolve_by_email_name(email_name)?;
        Ok(Email::new(schema, attributes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{EmailRegistry, RegistryError};
    use crate::error::EmailError;
    use crate::schema::EmailSchema;
    use std::sync::Arc;

    #[test]
    fn resolves_registered_schema_by_email_name() {
        let mut registry = EmailRegistry::new();
        let schema = registry
            .register(EmailSchema::named("Notifier::PasswordResetEmail").requires(["token"]))
            .expect("schema should register");

        let resolved = registry
            .resolve_by_email_name(&schema.email_name())
            .expect("email name should resolve");
        assert!(Arc::ptr_eq(&resolved, &schema));
        assert_eq!(registry.type_names(), vec!["Notifier::PasswordResetEmail".to_string()]);
    }

    #[test]
    fn rejects_anonymous_and_duplicate_schemas() {
        let mut registry = EmailRegistry::new();
        let anonymous = registry.register(EmailSchema::anonymous());
        assert!(matches!(anonymous, Err(RegistryError::AnonymousEmail)));

        registry
            .register(EmailSchema::named("Notifier::WelcomeEmail"))
            .expect("first registration should succeed");
        let duplicate = registry.register(EmailSchema::named("Notifier::WelcomeEmail"));
        assert!(matches!(duplicate, Err(RegistryError::DuplicateEmail(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_email_name_is_reported() {
        let registry = EmailRegistry::new();
        let err = registry
            .resolve_by_email_name("farewell")
            .expect_err("nothing registered");
        assert!(matches!(err, RegistryError::UnknownEmailName(ref name) if name == "farewell"));
        assert_eq!(err.to_string(), "unknown email name: farewell");
    }

    #[test]
    fn email_name_lookup_is_exact() {
        let mut registry = EmailRegistry::new();
        registry
            .register(EmailSchema::named("Notifier::WelcomeEmail"))
            .expect("schema should register");

        assert!(registry.resolve_by_email_name("welcome").is_ok());
        for padded in [" welcome ", "welcome ", "welcome\n"] {
            let err = registry
                .resolve_by_email_name(padded)
                .expect_err("only the exact email name resolves");
            assert!(matches!(err, RegistryError::UnknownEmailName(ref name) if name == padded));
        }
    }

    #[test]
    fn build_surfaces_construction_errors() {
        let mut registry = EmailRegistry::new();
        registry
            .register(EmailSchema::named("Notifier::WelcomeEmail").requires(["user_id"]))
            .expect("schema should register");

        let email = registry
            .build("welcome", [("user_id", 42)])
            .expect("email should build");
        assert_eq!(email.schema().email_name(), "welcome");

        let err = registry
            .build("welcome", [("locale", "fr")])
            .expect_err("missing user_id must fail");
        assert!(matches!(
            err,
            RegistryError::Email(EmailError::RequiredAttribute { .. })
        ));
    }
}
