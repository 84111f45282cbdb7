//! Error types for the case model.
//!
//! Every failing query returns a [`CaseError`]. Reference errors (a queried
//! bus that is absent, or an element pointing at a bus that is absent) are
//! raised lazily at query time so loaders can append elements in any order;
//! [`crate::Case::validate`] collects them eagerly on demand.
//!
//! # Example
//!
//! ```
//! use gridcase_core::{BusId, Case, CaseError};
//!
//! let case = Case::with_name("empty");
//! let err = case.find_bus(BusId::new(7)).unwrap_err();
//! assert!(err.is_reference_error());
//! assert!(matches!(err, CaseError::BusNotFound(id) if id == BusId::new(7)));
//! ```

use thiserror::Error;

use crate::{BusId, ElementKind};

/// Unified error type for case construction, queries and validation.
#[derive(Error, Debug)]
pub enum CaseError {
    /// A queried bus identity is not present in the case
    #[error("bus {0} not found in case")]
    BusNotFound(BusId),

    /// A branch or generator refers to a bus that is not in the case
    #[error("{element} {id} '{name}' refers to missing bus {bus}")]
    DanglingReference {
        element: ElementKind,
        id: usize,
        name: String,
        bus: BusId,
    },

    /// Two buses share the same identity
    #[error("bus {id} is defined twice (positions {first} and {second})")]
    DuplicateBusId {
        id: BusId,
        first: usize,
        second: usize,
    },

    /// Case-level configuration unusable by a consumer (e.g. base MVA)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors while reading a validation policy
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing errors while reading a validation policy
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience type alias for Results using CaseError.
pub type CaseResult<T> = Result<T, CaseError>;

impl CaseError {
    /// True for the reference-error category: an absent queried bus or a
    /// dangling element reference.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            CaseError::BusNotFound(_) | CaseError::DanglingReference { .. }
        )
    }

    /// The bus identity this error is about, when there is one.
    pub fn bus(&self) -> Option<BusId> {
        match self {
            CaseError::BusNotFound(bus) | CaseError::DanglingReference { bus, .. } => Some(*bus),
            CaseError::DuplicateBusId { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub(crate) fn dangling(element: ElementKind, id: usize, name: &str, bus: BusId) -> Self {
        CaseError::DanglingReference {
            element,
            id,
            name: name.to_string(),
            bus,
        }
    }
}

impl From<toml::de::Error> for CaseError {
    fn from(err: toml::de::Error) -> Self {
        CaseError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_reference_display_names_entity() {
        let err = CaseError::dangling(ElementKind::Generator, 3, "G3", BusId::new(9));
        let text = err.to_string();
        assert!(text.contains("generator 3"));
        assert!(text.contains("'G3'"));
        assert!(text.contains("bus 9"));
    }

    #[test]
    fn test_reference_error_category() {
        assert!(CaseError::BusNotFound(BusId::new(1)).is_reference_error());
        assert!(CaseError::dangling(ElementKind::Branch, 1, "L1", BusId::new(2)).is_reference_error());
        assert!(!CaseError::Configuration("base".into()).is_reference_error());
        assert!(!CaseError::DuplicateBusId {
            id: BusId::new(1),
            first: 0,
            second: 1
        }
        .is_reference_error());
    }

    #[test]
    fn test_bus_accessor() {
        assert_eq!(
            CaseError::BusNotFound(BusId::new(4)).bus(),
            Some(BusId::new(4))
        );
        assert_eq!(CaseError::Parse("x".into()).bus(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CaseError = io_err.into();
        assert!(matches!(err, CaseError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> CaseResult<()> {
            Err(CaseError::Configuration("base_mva must be positive".into()))
        }

        fn outer() -> CaseResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
