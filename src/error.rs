//! Error types for the station dashboard.
//!
//! External sources never surface raw transport errors: everything that can go
//! wrong while fetching is folded into a `SourceError`, which the pages render
//! as an inline notice.

use thiserror::Error;

/// Failure to obtain data from one of the external APIs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection, TLS or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not the JSON shape we expected.
    #[error("parse error: {0}")]
    Parse(String),

    /// A required URL, cookie or key is missing from the configuration.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Failure reading or writing one of the flat JSON documents.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize {path}: {message}")]
    Serialize { path: String, message: String },

    #[error("no event at index {0}")]
    EventIndexOutOfRange(usize),

    #[error("no journal entry with id {0}")]
    EntryNotFound(String),

    #[error("no to-do item with id {0}")]
    ItemNotFound(String),

    #[error("only {owner} may delete this entry")]
    NotOwner { owner: String },
}

/// Rejected user input. Messages are the ones shown to the crew.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Enn Datum/Zäit däerf net virum Ufank sinn!")]
    EndBeforeStart,

    #[error("Titel däerf net eidel sinn!")]
    EmptyTitle,

    #[error("De Text däerf net eidel sinn!")]
    EmptyContent,

    #[error("E Gefier kann nëmmen am Kalenner 'Gefierer' ausgewielt ginn!")]
    VehicleNotAllowed,

    #[error("Onbekannten Typ vu Kalenner: {0}")]
    UnknownCalendarType(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Falschen Benotzernumm oder Passwuert!")]
    InvalidCredentials,

    #[error("no shared password configured (set LEGASI_PASSWORD)")]
    PasswordNotConfigured,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("unknown timezone: {0}")]
    Timezone(String),

    #[error("invalid status class for digit {digit}: {message}")]
    StatusTable { digit: String, message: String },
}

/// Crate-level error used by the page and command handlers.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        assert_eq!(SourceError::HttpStatus(503).to_string(), "HTTP error: 503");
        assert_eq!(
            SourceError::Timeout(5).to_string(),
            "request timed out after 5s"
        );
        assert_eq!(
            SourceError::NotConfigured("weather api key".to_string()).to_string(),
            "not configured: weather api key"
        );
    }

    #[test]
    fn test_validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::EndBeforeStart.to_string(),
            "Enn Datum/Zäit däerf net virum Ufank sinn!"
        );
        assert_eq!(ValidationError::EmptyTitle.to_string(), "Titel däerf net eidel sinn!");
        assert_eq!(
            ValidationError::VehicleNotAllowed.to_string(),
            "E Gefier kann nëmmen am Kalenner 'Gefierer' ausgewielt ginn!"
        );
        assert_eq!(
            ValidationError::UnknownCalendarType("Kantin".to_string()).to_string(),
            "Onbekannten Typ vu Kalenner: Kantin"
        );
    }

    #[test]
    fn test_crate_error_wraps_transparently() {
        let err: Error = AuthError::InvalidCredentials.into();
        assert_eq!(err.to_string(), "Falschen Benotzernumm oder Passwuert!");
    }
}
