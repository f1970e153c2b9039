use actix_web::{Error, FromRequest, HttpRequest, HttpResponse, dev::Payload};
use futures::future::{Ready, ready};

use crate::utils::jwt;

/// Nom du cookie de session posé par login et effacé par logout
pub const AUTH_COOKIE_NAME: &str = "auth-token";

/// Récupère le token de session d'une requête.
/// Le cookie est la voie normale (navigateur); le header Authorization
/// "Bearer <token>" sert aux clients non-navigateur.
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(AUTH_COOKIE_NAME) {
        return Some(cookie.value().to_string());
    }

    let auth_str = req.headers().get("Authorization")?.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    /// Token brut, nécessaire aux handlers pour contrôler la session en BD
    pub token: String,
}

fn unauthorized(kind: &str, message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "error": kind,
        "message": message,
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes.
/// Seule la signature JWT est contrôlée ici; la session en BD est vérifiée
/// par les handlers via AuthService::get_user_from_token.
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extraire le token (cookie, puis header Authorization)
        let token = match extract_token(req) {
            Some(token) => token,
            None => {
                return ready(Err(unauthorized("unauthorized", "Not authenticated")));
            }
        };

        // 2. Vérifier la signature et l'expiration du JWT
        let claims = match jwt::verify_token(&token) {
            Ok(claims) => claims,
            Err(_) => {
                return ready(Err(unauthorized(
                    "unauthorized",
                    "Invalid or expired token",
                )));
            }
        };

        // 3. Créer et retourner AuthUser
        ready(Ok(AuthUser {
            user_id: claims.sub,
            token,
        }))
    }
}
