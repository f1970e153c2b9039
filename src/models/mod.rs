// ============================================================================
// MODELS
// ============================================================================
//
// Description:
//   Entités SeaORM du service d'authentification, une par table PostgreSQL,
//   plus les DTOs de l'API.
//
// Liste des modules:
//   - health : payload du health check
//   - users : comptes (email unique en minuscules, hash PBKDF2)
//   - email_verification_tokens : codes de vérification email (expire 15 min)
//   - user_sessions : sessions JWT persistées (expire 7 jours)
//   - dto : formes des requêtes/réponses API
//
// Points d'attention:
//   - Aucun SQL brut: tout passe par les entités
//   - L'unicité des emails est garantie par l'index UNIQUE, pas par le code
//
// ============================================================================

pub mod health;
pub mod users;
pub mod email_verification_tokens;
pub mod user_sessions;
pub mod dto;
