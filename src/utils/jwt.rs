use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

/// Durée de vie d'une session: le claim exp du JWT et la ligne user_sessions
/// expirent au même moment
pub const SESSION_LIFETIME_DAYS: i64 = 7;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// user_id propriétaire de la session
    pub sub: i32,
    /// Instant d'émission: distingue les tokens d'un même user émis à des
    /// secondes différentes
    pub iat: i64,
    pub exp: i64,
}

/// Clé de signature HS256. Sans JWT_SECRET on signe quand même (dev), mais
/// bruyamment: un secret par défaut en production serait une porte ouverte.
fn signing_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| {
        eprintln!("⚠️  WARNING: JWT_SECRET is not set, falling back to the dev key (INSECURE)");
        "eventrsvp-dev-secret-change-me".to_string()
    })
}

/// Signe un JWT de session de 7 jours pour un utilisateur
pub fn generate_token(user_id: i32) -> Result<String, String> {
    let issued_at = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: issued_at,
        exp: issued_at + SESSION_LIFETIME_DAYS * SECONDS_PER_DAY,
    };

    let key = EncodingKey::from_secret(signing_secret().as_ref());
    encode(&Header::default(), &claims, &key).map_err(|e| format!("Token signing failed: {}", e))
}

/// Contrôle la signature et l'expiration, et rend les claims.
/// Ne consulte jamais la BD: la validité structurelle seulement.
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let key = DecodingKey::from_secret(signing_secret().as_ref());

    decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}
