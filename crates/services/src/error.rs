//! Error types for the services crate.

use greeting_core::model::SectionId;
use thiserror::Error;

/// Why a navigation request was refused. State is untouched when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("unknown section: {0}")]
    UnknownSection(String),
    #[error("section is not registered: {0}")]
    Unregistered(SectionId),
}
