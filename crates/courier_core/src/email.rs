//! Email instance lifecycle.
//!
//! # Responsibility
//! - Validate construction input against a schema and assign optional values.
//! - Resolve the recipient and assemble delivery attributes on demand.
//!
//! # Invariants
//! - Construction fails before any optional assignment when a required key is
//!   missing, so no partially built email escapes.
//! - Declared delivery keys always overwrite values seeded by the delivery block.
//! - Relationship records are resolved at most once per email.
//!
//! # Concurrency
//! Relationship caches use `once_cell::unsync::OnceCell`, so `Email` is `!Sync`.
//! An email belongs to one task for its whole lifetime.

use crate::attributes::{Attributes, DeliveryAttributes};
use crate::config::{configuration, CourierConfig};
use crate::error::{EmailError, EmailResult};
use crate::naming::{relationship_id_key, relationship_type_name};
use crate::payload::Payload;
use crate::resolver::ResolveError;
use crate::schema::EmailSchema;
use log::{debug, trace};
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// One email built from a schema and construction input.
pub struct Email {
    schema: Arc<EmailSchema>,
    values: BTreeMap<String, Value>,
    relationships: BTreeMap<String, OnceCell<Value>>,
}

impl Email {
    /// Builds an email from loosely-typed input.
    ///
    /// # Errors
    /// - `RequiredAttribute` when any required key is absent.
    /// - Any error returned by a setter or an after-initialize hook.
    pub fn new(schema: Arc<EmailSchema>, attributes: impl Into<Attributes>) -> EmailResult<Self> {
        let attributes = attributes.into();

        let mut values = BTreeMap::new();
        for key in schema.required_keys() {
            let Some(value) = attributes.get(key) else {
                return Err(EmailError::RequiredAttribute {
                    email: schema.display_name().to_string(),
                    key: key.clone(),
                });
            };
            values.insert(key.clone(), value.clone());
        }

        let relationships = schema
            .relationship_keys()
            .iter()
            .map(|name| (name.clone(), OnceCell::new()))
            .collect();
        let mut email = Self {
            schema: Arc::clone(&schema),
            values,
            relationships,
        };

        let required = schema
            .required_keys()
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>();
        for (key, value) in attributes {
            if required.contains(key.as_str()) {
                continue;
            }
            match schema.setter_for(&key) {
                Some(setter) => setter(&mut email, value)?,
                None => trace!(
                    "event=email_init module=email status=skipped email={} key={}",
                    schema.email_name(),
                    key
                ),
            }
        }

        for hook in schema.initialize_hooks() {
            hook(&mut email)?;
        }

        debug!(
            "event=email_init module=email status=ok email={} stored={}",
            schema.email_name(),
            email.values.len()
        );
        Ok(email)
    }

    pub fn schema(&self) -> &Arc<EmailSchema> {
        &self.schema
    }

    /// Returns a stored required or optional value.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Stores a value; intended for setters and after-initialize hooks.
    pub fn store(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns whether the schema declares an accessor with this name.
    pub fn responds_to(&self, name: &str) -> bool {
        self.schema.has_accessor(name)
    }

    /// Invokes the named accessor.
    pub fn read(&self, name: &str) -> EmailResult<Value> {
        match self.schema.accessor_for(name) {
            Some(accessor) => accessor(self),
            None => Err(EmailError::UndefinedAccessor {
                email: self.schema.display_name().to_string(),
                attribute: name.to_string(),
            }),
        }
    }

    /// Returns the record behind a declared relationship, resolving it once.
    pub fn related(&self, name: &str) -> EmailResult<&Value> {
        let Some(cell) = self.relationships.get(name) else {
            return Err(EmailError::UndefinedAccessor {
                email: self.schema.display_name().to_string(),
                attribute: name.to_string(),
            });
        };

        cell.get_or_try_init(|| -> EmailResult<Value> {
            let resolver =
                self.schema
                    .record_resolver()
                    .ok_or_else(|| ResolveError::ResolverMissing {
                        relationship: name.to_string(),
                    })?;
            let id = self
                .values
                .get(&relationship_id_key(name))
                .cloned()
                .unwrap_or(Value::Null);
            let record = resolver.resolve(&relationship_type_name(name), &id)?;
            trace!(
                "event=relationship_resolve module=email status=ok relationship={}",
                name
            );
            Ok(record)
        })
    }

    /// Resolves the recipient against the process-wide configuration.
    pub fn recipient(&self) -> EmailResult<Value> {
        self.recipient_with(&configuration())
    }

    /// Resolves the recipient against an explicit configuration.
    ///
    /// A non-empty interceptor address always wins.
    pub fn recipient_with(&self, config: &CourierConfig) -> EmailResult<Value> {
        if let Some(address) = config.interceptor() {
            return Ok(Value::String(address.to_string()));
        }

        let undefined = || EmailError::RecipientUndefined {
            email: self.schema.display_name().to_string(),
        };
        let method = self.schema.recipient_method().ok_or_else(undefined)?;
        let accessor = self.schema.accessor_for(method).ok_or_else(undefined)?;
        accessor(self)
    }

    /// Runs the delivery block, then applies every effective delivery key.
    ///
    /// # Errors
    /// - `DeliveredAttribute` when a delivery key has no accessor.
    /// - Errors from the delivery block or from an accessor, unchanged.
    pub fn delivery_attributes(&self) -> EmailResult<DeliveryAttributes> {
        let mut attributes = DeliveryAttributes::new();
        if let Some(block) = self.schema.delivery_block() {
            block(self, &mut attributes)?;
        }

        for key in self.schema.effective_delivery_keys() {
            let Some(accessor) = self.schema.accessor_for(&key) else {
                return Err(EmailError::DeliveredAttribute {
                    email: self.schema.display_name().to_string(),
                    attribute: key,
                });
            };
            let value = accessor(self)?;
            attributes.insert(key, value);
        }
        Ok(attributes)
    }

    /// Assembles the payload using the process-wide configuration.
    pub fn payload(&self) -> EmailResult<Payload> {
        self.payload_with(&configuration())
    }

    pub fn payload_with(&self, config: &CourierConfig) -> EmailResult<Payload> {
        let payload = Payload {
            template_name: self.schema.email_template_name(),
            recipient: self.recipient_with(config)?,
            attributes: self.delivery_attributes()?,
        };
        debug!(
            "event=email_payload module=email status=ok email={} attributes={}",
            self.schema.email_name(),
            payload.attributes.len()
        );
        Ok(payload)
    }
}

impl std::fmt::Debug for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Email")
            .field("type_name", &self.schema.type_name())
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
