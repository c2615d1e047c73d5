use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const MSG_INVALID_REQUEST: &str = "Requête invalide";
pub const MSG_UNAUTHORIZED: &str = "Non autorisé";
pub const MSG_FORBIDDEN: &str = "Accès interdit";
pub const MSG_NOT_FOUND: &str = "Ressource non trouvée";
pub const MSG_SERVER_ERROR: &str = "Erreur serveur WordPress";
pub const MSG_UNREACHABLE: &str =
    "WordPress inaccessible. Vérifiez votre connexion et l'URL WordPress.";
pub const MSG_CONNECTION_FAILED: &str = "Erreur de connexion à WordPress";

/// Failure taxonomy shared by every remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 4xx other than the auth and not-found codes
    Validation,
    /// 401 or 403
    Auth,
    NotFound,
    /// 5xx
    Server,
    /// No response at all: refused connection, DNS failure, timeout
    NetworkUnreachable,
    Unknown,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Auth,
            404 => ErrorKind::NotFound,
            400..=499 => ErrorKind::Validation,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }
}

/// Uniform failure shape returned by the remote adapter.
///
/// `status` is `None` whenever no HTTP response was received. `details`
/// carries the remote error payload verbatim when one was sent.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct NormalizedError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub details: Option<Value>,
}

/// Title and message pair handed to a [`Notifier`](crate::Notifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub title: String,
    pub message: String,
}

impl NormalizedError {
    /// Build the error for an HTTP response with a non-success status.
    pub fn from_status(status: u16, details: Option<Value>) -> Self {
        let message = match status {
            400 => MSG_INVALID_REQUEST.to_string(),
            401 => MSG_UNAUTHORIZED.to_string(),
            403 => MSG_FORBIDDEN.to_string(),
            404 => MSG_NOT_FOUND.to_string(),
            500 => MSG_SERVER_ERROR.to_string(),
            other => format!("Erreur HTTP {}", other),
        };
        Self {
            kind: ErrorKind::from_status(status),
            message,
            status: Some(status),
            details,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            kind: ErrorKind::NetworkUnreachable,
            message: MSG_UNREACHABLE.to_string(),
            status: None,
            details: None,
        }
    }

    /// Failures that are neither an HTTP error status nor a missing response,
    /// such as an undecodable success body.
    pub fn unknown(details: Option<Value>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: MSG_CONNECTION_FAILED.to_string(),
            status: None,
            details,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::NetworkUnreachable
    }

    /// The human-readable `message` field of the remote error payload, if any.
    pub fn remote_message(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    pub fn presentation(&self) -> Presentation {
        let (title, message) = match (self.kind, self.status) {
            (_, Some(400)) => (
                "Requête invalide".to_string(),
                self.remote_message()
                    .unwrap_or("Les données envoyées sont incorrectes.")
                    .to_string(),
            ),
            (_, Some(401)) => (
                "Non autorisé".to_string(),
                "Vous devez vous connecter pour accéder à cette ressource.".to_string(),
            ),
            (_, Some(403)) => (
                "Accès interdit".to_string(),
                "Vous n'avez pas les permissions nécessaires.".to_string(),
            ),
            (_, Some(404)) => (
                "Ressource introuvable".to_string(),
                "L'élément demandé n'existe plus ou a été déplacé.".to_string(),
            ),
            (_, Some(500)) => (
                "Erreur serveur".to_string(),
                "Le serveur rencontre des difficultés. Réessayez plus tard.".to_string(),
            ),
            (_, Some(status)) => (
                format!("Erreur {}", status),
                self.remote_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Une erreur {} s'est produite.", status)),
            ),
            (ErrorKind::NetworkUnreachable, None) => (
                "Problème de connexion".to_string(),
                "Impossible de contacter le serveur. Vérifiez votre connexion internet."
                    .to_string(),
            ),
            (_, None) => {
                let message = if self.message.is_empty() {
                    "Une erreur inattendue s'est produite.".to_string()
                } else {
                    self.message.clone()
                };
                ("Erreur".to_string(), message)
            }
        };
        Presentation { title, message }
    }
}
