//! Error types shared across the application
//!
//! Store failures carry an optional HTTP-like status code so the bill list
//! can classify them structurally instead of searching message text.

use thiserror::Error;

/// Failure reported by a bill store or the key/value store.
///
/// `Clone` because store results travel inside iced messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    /// Status code set by the store, when it has one
    pub status: Option<u16>,
    pub message: String,
}

impl StoreError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(404, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::http(500, message)
    }

    /// Error without any status code (transport failures, unknown causes)
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::internal(format!("database error: {}", e))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::internal(format!("I/O error: {}", e))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", e))
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::internal(format!("task join error: {}", e))
    }
}

/// Why the bill list could not be fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Erreur 404")]
    NotFound,

    #[error("Erreur 500")]
    ServerError,

    #[error("Erreur : {0}")]
    Unknown(String),
}

impl From<&StoreError> for FetchError {
    fn from(e: &StoreError) -> Self {
        match e.status {
            Some(404) => FetchError::NotFound,
            Some(500) => FetchError::ServerError,
            _ => FetchError::Unknown(e.message.clone()),
        }
    }
}

/// User-recoverable problems with the new bill form.
///
/// The `Display` text is shown verbatim in the blocking notice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Le fichier n'est pas valide. Veuillez télécharger un fichier jpg, jpeg ou png")]
    UnsupportedFile,

    #[error("Le justificatif n'a pas encore été envoyé. Veuillez patienter ou sélectionner à nouveau le fichier")]
    ReceiptNotUploaded,

    #[error("Le champ « {0} » est obligatoire")]
    MissingField(&'static str),

    #[error("Montant invalide : {0}")]
    InvalidAmount(String),

    #[error("Date invalide : {0}")]
    InvalidDate(String),
}

/// Problems reading the logged-in user from the key/value store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no user is logged in")]
    NoUser,

    #[error("stored user is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("could not read the stored user: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a data directory; set BILLED_DATA_DIR")]
    NoDataDir,
}

/// Startup failures returned by `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog error: {0}")]
    Store(#[from] StoreError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("GUI error: {0}")]
    Gui(#[from] iced::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classified_from_status() {
        assert_eq!(FetchError::from(&StoreError::not_found("missing")), FetchError::NotFound);
        assert_eq!(FetchError::from(&StoreError::internal("boom")), FetchError::ServerError);
        assert_eq!(
            FetchError::from(&StoreError::http(403, "forbidden")),
            FetchError::Unknown("forbidden".to_string())
        );
    }

    #[test]
    fn test_status_wins_over_message_text() {
        // Classification never looks at the message
        let error = StoreError::other("Erreur 404");
        assert_eq!(
            FetchError::from(&error),
            FetchError::Unknown("Erreur 404".to_string())
        );
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::NotFound.to_string(), "Erreur 404");
        assert_eq!(FetchError::ServerError.to_string(), "Erreur 500");
    }

    #[test]
    fn test_unsupported_file_notice_names_formats() {
        let notice = ValidationError::UnsupportedFile.to_string();
        assert!(notice.contains("jpg"));
        assert!(notice.contains("jpeg"));
        assert!(notice.contains("png"));
    }
}
