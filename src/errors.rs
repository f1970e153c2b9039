// ============================================================================
// ERREURS DU SERVICE D'AUTHENTIFICATION
// ============================================================================
//
// Description:
//   Taxonomie d'erreurs typée: les handlers et les tests branchent sur la
//   variante, jamais sur le texte du message. Chaque variante porte un kind
//   stable (pour le JSON) et un status HTTP.
//
// Points d'attention:
//   - InvalidCredentials reste volontairement vague: même kind et même
//     message pour "email inconnu" et "mauvais mot de passe"
//   - Les erreurs BD sont classifiées ici: violation d'unicité -> Conflict,
//     tout le reste -> ServiceUnavailable (loggé côté serveur, jamais
//     renvoyé brut au client)
//
// ============================================================================

use actix_web::{HttpResponse, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User with this email already exists")]
    Conflict,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email address before signing in")]
    UnverifiedEmail,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code has expired")]
    CodeExpired,

    #[error("No account found with this email")]
    NotFound,

    #[error("Email address is already verified")]
    AlreadyVerified,

    #[error("Service temporarily unavailable, please try again")]
    ServiceUnavailable,

    #[error("Operation failed")]
    Internal,
}

impl AuthError {
    /// Kind stable exposé dans le JSON d'erreur (les clients branchent dessus)
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::Conflict => "conflict",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::UnverifiedEmail => "unverified_email",
            AuthError::InvalidCode => "invalid_code",
            AuthError::CodeExpired => "code_expired",
            AuthError::NotFound => "not_found",
            AuthError::AlreadyVerified => "already_verified",
            AuthError::ServiceUnavailable => "service_unavailable",
            AuthError::Internal => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::UnverifiedEmail => StatusCode::FORBIDDEN,
            AuthError::InvalidCode => StatusCode::BAD_REQUEST,
            AuthError::CodeExpired => StatusCode::BAD_REQUEST,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::AlreadyVerified => StatusCode::CONFLICT,
            AuthError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Construit la réponse JSON: {"error": kind, "message": ...}
    /// UnverifiedEmail porte en plus needs_verification pour guider le client.
    pub fn to_http_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if matches!(self, AuthError::UnverifiedEmail) {
            body["needs_verification"] = serde_json::Value::Bool(true);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DbErr> for AuthError {
    fn from(err: DbErr) -> Self {
        // La contrainte UNIQUE est le vrai gardien de l'unicité des emails:
        // une insertion concurrente perd la course et devient un Conflict
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return AuthError::Conflict;
        }
        log::error!("Database error: {err}");
        AuthError::ServiceUnavailable
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        messages.sort();

        if messages.is_empty() {
            AuthError::Validation("Invalid input".to_string())
        } else {
            AuthError::Validation(messages.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(AuthError::InvalidCredentials.kind(), "invalid_credentials");
        assert_eq!(AuthError::Conflict.kind(), "conflict");
        assert_eq!(AuthError::CodeExpired.kind(), "code_expired");
    }

    #[test]
    fn test_credential_error_is_generic() {
        // Le message ne doit jamais dire quel facteur était faux
        let message = AuthError::InvalidCredentials.to_string();
        assert!(!message.to_lowercase().contains("not found"));
        assert!(!message.to_lowercase().contains("wrong password"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
