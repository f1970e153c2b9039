// ============================================================================
// SERVICE : EMAIL
// ============================================================================
//
// Description:
//   Canal d'envoi d'emails derrière un trait: AuthService ne connaît que
//   EmailSender. Brancher un vrai provider (SMTP, SES...) se fait dans
//   main.rs sans toucher à la logique d'authentification.
//
// Points d'attention:
//   - L'envoi est best-effort: un échec est loggé, jamais propagé. La
//     transition d'état (inscription, resend) est déjà commise.
//
// ============================================================================

use async_trait::async_trait;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

/// Implémentation par défaut: écrit l'email dans les logs du serveur.
/// Suffisant en développement, remplacé par un vrai provider en production.
pub struct ConsoleEmailSender;

#[async_trait]
impl EmailSender for ConsoleEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        log::info!("[EMAIL] To: {} | Subject: {} | {}", to, subject, body);
        Ok(())
    }
}

/// Compose le sujet et le corps de l'email de vérification
pub fn verification_email(code: &str) -> (String, String) {
    (
        "Verify your email address".to_string(),
        format!(
            "Your verification code is: {}. It expires in 15 minutes.",
            code
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_contains_code() {
        let (subject, body) = verification_email("AB12CD");
        assert_eq!(subject, "Verify your email address");
        assert!(body.contains("AB12CD"));
    }
}
