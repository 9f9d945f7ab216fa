//! Declaration-time email schema.
//!
//! # Responsibility
//! - Accumulate required keys, relationships, delivery keys and the delivery
//!   block declared for one email type.
//! - Resolve accessors and setters to closures at declaration time, so the
//!   instance never dispatches by reflection.
//!
//! # Invariants
//! - `subclass` copies every declaration; later declarations on the child never
//!   leak into the parent, and vice versa.
//! - `required_keys` and `delivery_keys` are additive and never deduplicated.
//! - `effective_delivery_keys` is deduplicated, first occurrence wins.
//! - A schema is frozen once wrapped in `Arc` and handed to `Email::new`.

use crate::attributes::DeliveryAttributes;
use crate::email::Email;
use crate::error::EmailResult;
use crate::naming::{email_name_for, relationship_id_key};
use crate::resolver::RecordResolver;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Call-to-action flag every email delivers ahead of its own keys.
pub const SHOW_CALL_TO_ACTION: &str = "show_call_to_action";

/// Reads one named value from an email.
pub type Accessor = Arc<dyn Fn(&Email) -> EmailResult<Value> + Send + Sync>;
/// Assigns one optional input value on an email under construction.
pub type Setter = Arc<dyn Fn(&mut Email, Value) -> EmailResult<()> + Send + Sync>;
/// Runs after construction, in declaration order.
pub type InitializeHook = Arc<dyn Fn(&mut Email) -> EmailResult<()> + Send + Sync>;
/// Seeds or rewrites delivery attributes before declared keys are applied.
pub type DeliveryBlock =
    Arc<dyn Fn(&Email, &mut DeliveryAttributes) -> EmailResult<()> + Send + Sync>;

/// Declarations for one email type.
#[derive(Clone)]
pub struct EmailSchema {
    type_name: Option<String>,
    required_keys: Vec<String>,
    relationship_keys: Vec<String>,
    delivery_keys: Vec<String>,
    default_delivery_keys: Vec<String>,
    delivery_block: Option<DeliveryBlock>,
    recipient_method: Option<String>,
    template_name: Option<String>,
    accessors: BTreeMap<String, Accessor>,
    setters: BTreeMap<String, Setter>,
    after_initialize: Vec<InitializeHook>,
    resolver: Option<Arc<dyn RecordResolver>>,
}

impl EmailSchema {
    fn root(type_name: Option<String>) -> Self {
        let mut accessors: BTreeMap<String, Accessor> = BTreeMap::new();
        accessors.insert(
            SHOW_CALL_TO_ACTION.to_string(),
            Arc::new(|_: &Email| -> EmailResult<Value> {
                Ok(Value::String("false".to_string()))
            }),
        );

        Self {
            type_name,
            required_keys: vec![],
            relationship_keys: vec![],
            delivery_keys: vec![],
            default_delivery_keys: vec![SHOW_CALL_TO_ACTION.to_string()],
            delivery_block: None,
            recipient_method: None,
            template_name: None,
            accessors,
            setters: BTreeMap::new(),
            after_initialize: vec![],
            resolver: None,
        }
    }

    /// Starts a schema for a named email type, e.g. `Notifier::WelcomeEmail`.
    pub fn named(type_name: impl Into<String>) -> Self {
        Self::root(Some(type_name.into()))
    }

    /// Starts a schema with no declared type name.
    pub fn anonymous() -> Self {
        Self::root(None)
    }

    /// Derives a child schema carrying a copy of every declaration.
    pub fn subclass(&self, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..self.clone()
        }
    }

    /// Derives an unnamed child schema.
    pub fn anonymous_subclass(&self) -> Self {
        Self {
            type_name: None,
            ..self.clone()
        }
    }

    /// Declares required input keys, each with a read-only accessor.
    pub fn requires<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            let key = key.into();
            let stored = key.clone();
            self.accessors.insert(
                key.clone(),
                Arc::new(move |email: &Email| -> EmailResult<Value> {
                    Ok(email.attribute(&stored).cloned().unwrap_or(Value::Null))
                }),
            );
            self.required_keys.push(key);
        }
        self
    }

    /// Declares relationships: a required `{name}_id` plus a cached `name` accessor.
    pub fn belongs_to<I, K>(mut self, relationships: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for relationship in relationships {
            let relationship = relationship.into();
            self = self.requires([relationship_id_key(&relationship)]);

            let name = relationship.clone();
            self.accessors.insert(
                relationship.clone(),
                Arc::new(move |email: &Email| email.related(&name).cloned()),
            );
            self.relationship_keys.push(relationship);
        }
        self
    }

    /// Declares optional input keys with a storing setter and a reader.
    ///
    /// The reader yields `null` when the key was not supplied.
    pub fn optional<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            let key = key.into();
            let target = key.clone();
            self.setters.insert(
                key.clone(),
                Arc::new(move |email: &mut Email, value: Value| -> EmailResult<()> {
                    email.store(target.clone(), value);
                    Ok(())
                }),
            );
            let stored = key.clone();
            self.accessors.insert(
                key,
                Arc::new(move |email: &Email| -> EmailResult<Value> {
                    Ok(email.attribute(&stored).cloned().unwrap_or(Value::Null))
                }),
            );
        }
        self
    }

    /// Declares a custom setter for one optional input key.
    pub fn setter<F>(mut self, key: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut Email, Value) -> EmailResult<()> + Send + Sync + 'static,
    {
        self.setters.insert(key.into(), Arc::new(setter));
        self
    }

    /// Declares a computed accessor; replaces any accessor of the same name.
    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Email) -> EmailResult<Value> + Send + Sync + 'static,
    {
        self.accessors.insert(name.into(), Arc::new(accessor));
        self
    }

    /// Appends delivery keys.
    pub fn deliver<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.delivery_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Appends delivery keys and replaces the delivery block.
    pub fn deliver_with<I, K, F>(self, keys: I, block: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&Email, &mut DeliveryAttributes) -> EmailResult<()> + Send + Sync + 'static,
    {
        let mut schema = self.deliver(keys);
        schema.delivery_block = Some(Arc::new(block));
        schema
    }

    /// Names the accessor that yields the recipient.
    pub fn recipient(mut self, accessor: impl Into<String>) -> Self {
        self.recipient_method = Some(accessor.into());
        self
    }

    /// Registers a hook run after construction.
    pub fn after_initialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Email) -> EmailResult<()> + Send + Sync + 'static,
    {
        self.after_initialize.push(Arc::new(hook));
        self
    }

    /// Overrides the template name, which otherwise equals `email_name`.
    pub fn template_name(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = Some(template_name.into());
        self
    }

    /// Sets the resolver used by relationship accessors.
    pub fn resolver(mut self, resolver: Arc<dyn RecordResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Type name used in error messages.
    pub fn display_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or("(anonymous email)")
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    pub fn relationship_keys(&self) -> &[String] {
        &self.relationship_keys
    }

    /// Delivery keys declared on this type and its ancestors.
    pub fn delivery_keys(&self) -> &[String] {
        &self.delivery_keys
    }

    pub fn default_delivery_keys(&self) -> &[String] {
        &self.default_delivery_keys
    }

    /// Default keys followed by declared keys, deduplicated.
    pub fn effective_delivery_keys(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.default_delivery_keys
            .iter()
            .chain(self.delivery_keys.iter())
            .filter(|key| seen.insert(key.as_str()))
            .cloned()
            .collect()
    }

    pub fn recipient_method(&self) -> Option<&str> {
        self.recipient_method.as_deref()
    }

    pub fn has_delivery_block(&self) -> bool {
        self.delivery_block.is_some()
    }

    pub fn email_name(&self) -> String {
        email_name_for(self.type_name.as_deref())
    }

    pub fn email_template_name(&self) -> String {
        match &self.template_name {
            Some(template_name) => template_name.clone(),
            None => self.email_name(),
        }
    }

    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    pub fn has_setter(&self, key: &str) -> bool {
        self.setters.contains_key(key)
    }

    pub(crate) fn accessor_for(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name)
    }

    pub(crate) fn setter_for(&self, key: &str) -> Option<&Setter> {
        self.setters.get(key)
    }

    pub(crate) fn initialize_hooks(&self) -> &[InitializeHook] {
        &self.after_initialize
    }

    pub(crate) fn delivery_block(&self) -> Option<&DeliveryBlock> {
        self.delivery_block.as_ref()
    }

    pub(crate) fn record_resolver(&self) -> Option<&Arc<dyn RecordResolver>> {
        self.resolver.as_ref()
    }
}

impl Debug for EmailSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSchema")
            .field("type_name", &self.type_name)
            .field("required_keys", &self.required_keys)
            .field("relationship_keys", &self.relationship_keys)
            .field("delivery_keys", &self.delivery_keys)
            .field("recipient_method", &self.recipient_method)
            .field("template_name", &self.template_name)
            .field("accessors", &self.accessors.keys().collect::<Vec<_>>())
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
