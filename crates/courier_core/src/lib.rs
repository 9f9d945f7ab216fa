//! Declarative notification emails.
//! Schemas declare what an email requires and delivers; emails validate their
//! input and assemble the payload handed to a delivery transport.

pub mod attributes;
pub mod config;
pub mod email;
pub mod error;
pub mod logging;
pub mod naming;
pub mod payload;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use attributes::{Attributes, AttributesError, DeliveryAttributes};
pub use config::{configuration, configure, reset_configuration, CourierConfig};
pub use email::Email;
pub use error::{EmailError, EmailResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use payload::Payload;
pub use registry::{EmailRegistry, RegistryError};
pub use resolver::{RecordRegistry, RecordResolver, ResolveError};
pub use schema::{EmailSchema, SHOW_CALL_TO_ACTION};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
