//! Email lifecycle errors.
//!
//! # Invariants
//! - Errors raised by an accessor's own logic pass through unchanged.
//! - Messages always name the email type that failed.

use crate::resolver::ResolveError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EmailResult<T> = Result<T, EmailError>;

/// Errors surfaced by construction, recipient resolution and payload assembly.
#[derive(Debug)]
pub enum EmailError {
    /// A declared required key was absent from the construction input.
    RequiredAttribute { email: String, key: String },
    /// No recipient accessor is declared, or the declared one does not exist.
    RecipientUndefined { email: String },
    /// A delivery key has no accessor on the email.
    DeliveredAttribute { email: String, attribute: String },
    /// `Email::read` was called for a name with no accessor.
    UndefinedAccessor { email: String, attribute: String },
    /// Relationship lookup failed.
    Resolution(ResolveError),
    /// Fault raised by a user-declared accessor, setter, hook or delivery block.
    Accessor(Box<dyn Error + Send + Sync>),
}

impl EmailError {
    /// Wraps an arbitrary fault raised inside user-declared email logic.
    pub fn accessor(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Accessor(err.into())
    }
}

impl Display for EmailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequiredAttribute { email, key } => write!(f, "{email} key not found: {key}"),
            Self::RecipientUndefined { email } => {
                write!(f, "Please declare a recipient in {email}")
            }
            Self::DeliveredAttribute { email, attribute } => {
                write!(f, "{email} undefined delivery attribute `{attribute}`")
            }
            Self::UndefinedAccessor { email, attribute } => {
                write!(f, "{email} undefined accessor `{attribute}`")
            }
            Self::Resolution(err) => write!(f, "{err}"),
            Self::Accessor(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EmailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resolution(err) => Some(err),
            Self::Accessor(err) => Some(err.as_ref()),
            Self::RequiredAttribute { .. }
            | Self::RecipientUndefined { .. }
            | Self::DeliveredAttribute { .. }
            | Self::UndefinedAccessor { .. } => None,
        }
    }
}

impl From<ResolveError> for EmailError {
    fn from(value: ResolveError) -> Self {
        Self::Resolution(value)
    }
}
