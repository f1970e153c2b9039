// DTOs du flux d'authentification (requêtes + réponses structurées)
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::users;

// DTO pour l'inscription
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub password: String,
}

// DTO pour la connexion
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// DTO pour la vérification d'email
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

// DTO pour redemander un code de vérification
#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Projection publique d'un user: la seule forme qui sort du service.
/// Jamais de password_hash ici.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

// Réponse après inscription
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub needs_verification: bool,
}

// Réponse après login (le token part aussi en cookie HttpOnly)
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

// Réponse après vérification d'email
#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    pub user: UserResponse,
}

// Réponse pour /auth/me
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}
