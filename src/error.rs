//! Error taxonomy for the form engine

use crate::form::FormId;
use thiserror::Error;

/// Reason a model primitive (save, destroy, reset) rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("invalid: {0}")]
    Invalid(String),
    #[error("conflicting write in progress")]
    Conflict,
}

/// Errors surfaced by form operations
///
/// Guard rejections are not errors; they resolve through the outcome enums.
/// `Clone` is required because a pending submit is shared with queued followers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("form {form} failed to persist: {source}")]
    Persistence {
        form: FormId,
        #[source]
        source: ModelError,
    },
    #[error("form {0} is not registered")]
    UnknownForm(FormId),
    #[error("form task aborted: {0}")]
    TaskAborted(String),
    #[error("a navigation guard is already installed")]
    NavigationGuardInstalled,
}

impl FormError {
    /// The model-level reason, if this error came from a persistence primitive
    pub fn reason(&self) -> Option<&ModelError> {
        match self {
            FormError::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type FormResult<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_display_includes_reason() {
        let err = FormError::Persistence {
            form: FormId::new(3, 1),
            source: ModelError::Rejected("title taken".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("form#3v1"));
        assert!(msg.contains("title taken"));
    }

    #[test]
    fn test_reason_only_for_persistence() {
        let err = FormError::Persistence {
            form: FormId::new(0, 0),
            source: ModelError::Conflict,
        };
        assert_eq!(err.reason(), Some(&ModelError::Conflict));
        assert!(FormError::UnknownForm(FormId::new(0, 0)).reason().is_none());
    }
}
