// ============================================================================
// ROUTES : AUTHENTIFICATION
// ============================================================================
//
// Description:
//   Couche HTTP au-dessus de AuthService. Chaque handler délègue au service
//   puis traduit le Result en réponse: la logique métier ne vit pas ici.
//
// Endpoints:
//   POST /api/auth/register            -> créer un compte (PUBLIC)
//   POST /api/auth/login               -> ouvrir une session + cookie (PUBLIC)
//   POST /api/auth/verify-email        -> valider un code (PUBLIC)
//   POST /api/auth/resend-verification -> renvoyer un code (PUBLIC)
//   GET  /api/auth/me                  -> utilisateur courant (PROTÉGÉE)
//   POST /api/auth/logout              -> fermer la session (PUBLIC)
//
// Points d'attention:
//   - le token voyage dans un cookie HttpOnly (voies non-navigateur: Bearer)
//   - logout répond 200 même sans session: être déconnecté est un état,
//     pas une opération qui peut rater
//
// ============================================================================

use actix_web::{
    HttpRequest, HttpResponse,
    cookie::{Cookie, SameSite, time::Duration as CookieDuration},
    get, post, web,
};
use sea_orm::DatabaseConnection;

use crate::middleware::auth::{AUTH_COOKIE_NAME, AuthUser, extract_token};
use crate::models::dto::{
    LoginRequest, MeResponse, RegisterRequest, ResendVerificationRequest, VerifyEmailRequest,
    VerifyEmailResponse,
};
use crate::services::auth_service::AuthService;
use crate::services::email_service::EmailSender;
use crate::utils::jwt;

fn is_production() -> bool {
    std::env::var("APP_ENV").map(|v| v == "production").unwrap_or(false)
}

/// Cookie de session: HttpOnly (invisible au JS), même durée de vie que la
/// ligne user_sessions, Secure uniquement en production (HTTP local sinon)
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE_NAME, token)
        .path("/")
        .http_only(true)
        .secure(is_production())
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(jwt::SESSION_LIFETIME_DAYS))
        .finish()
}

/// Cookie vide à durée nulle: le navigateur le supprime immédiatement
fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE_NAME, "")
        .path("/")
        .http_only(true)
        .secure(is_production())
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .finish()
}

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<dyn EmailSender>,
) -> HttpResponse {
    match AuthService::register(db.get_ref(), mailer.get_ref(), body.into_inner()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => e.to_http_response(),
    }
}

/// POST /auth/login - Se connecter (PUBLIC)
/// Pose le cookie de session en plus de renvoyer le token dans le corps
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AuthService::login(db.get_ref(), body.into_inner()).await {
        Ok(response) => HttpResponse::Ok()
            .cookie(session_cookie(response.token.clone()))
            .json(response),
        Err(e) => e.to_http_response(),
    }
}

/// POST /auth/verify-email - Valider un code de vérification (PUBLIC)
#[post("/verify-email")]
pub async fn verify_email(
    body: web::Json<VerifyEmailRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AuthService::verify_email(db.get_ref(), body.into_inner()).await {
        Ok(user) => HttpResponse::Ok().json(VerifyEmailResponse { user }),
        Err(e) => e.to_http_response(),
    }
}

/// POST /auth/resend-verification - Renvoyer un code tout neuf (PUBLIC)
#[post("/resend-verification")]
pub async fn resend_verification(
    body: web::Json<ResendVerificationRequest>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<dyn EmailSender>,
) -> HttpResponse {
    match AuthService::resend_verification_code(db.get_ref(), mailer.get_ref(), &body.email).await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Verification code sent"
        })),
        Err(e) => e.to_http_response(),
    }
}

/// GET /auth/me - Utilisateur courant (PROTÉGÉE)
/// L'extracteur a déjà validé la signature du JWT; on contrôle ici que la
/// session existe toujours en BD (un logout la tue avant l'expiration du JWT)
#[get("/me")]
pub async fn me(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> HttpResponse {
    match AuthService::get_user_from_token(db.get_ref(), &auth_user.token).await {
        Ok(Some(user)) => HttpResponse::Ok().json(MeResponse { user }),
        Ok(None) => HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "unauthorized",
            "message": "Invalid or expired token"
        })),
        Err(e) => e.to_http_response(),
    }
}

/// POST /auth/logout - Fermer la session (PUBLIC)
/// Pas de token = déjà déconnecté: on efface le cookie et on répond 200
#[post("/logout")]
pub async fn logout(req: HttpRequest, db: web::Data<DatabaseConnection>) -> HttpResponse {
    // 1. Supprimer la session si un token accompagne la requête
    if let Some(token) = extract_token(&req) {
        if let Err(e) = AuthService::logout(db.get_ref(), &token).await {
            return e.to_http_response();
        }
    }

    // 2. Effacer le cookie côté navigateur dans tous les cas
    HttpResponse::Ok()
        .cookie(clear_session_cookie())
        .json(serde_json::json!({ "success": true }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(verify_email)
            .service(resend_verification)
            .service(me)
            .service(logout),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{email_verification_tokens, user_sessions, users};
    use crate::routes::configure_routes;
    use crate::services::email_service::ConsoleEmailSender;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use sea_orm::{ConnectionTrait, Database, Schema};
    use std::sync::Arc;

    /// BD SQLite en mémoire avec le schéma des trois tables
    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        for stmt in [
            schema.create_table_from_entity(users::Entity),
            schema.create_table_from_entity(email_verification_tokens::Entity),
            schema.create_table_from_entity(user_sessions::Entity),
        ] {
            db.execute(backend.build(&stmt))
                .await
                .expect("Failed to create table");
        }

        db
    }

    /// App complète telle que main.rs l'assemble: mêmes routes, même wiring
    macro_rules! init_app {
        ($db:expr) => {{
            let mailer: Arc<dyn EmailSender> = Arc::new(ConsoleEmailSender);
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db.clone()))
                    .app_data(web::Data::from(mailer))
                    .configure(configure_routes),
            )
            .await
        }};
    }

    fn post_json(uri: &str, body: serde_json::Value) -> test::TestRequest {
        test::TestRequest::post().uri(uri).set_json(body)
    }

    /// Relit en BD le code le plus récent d'un user
    async fn latest_code(db: &DatabaseConnection, user_id: i32) -> String {
        use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

        email_verification_tokens::Entity::find()
            .filter(email_verification_tokens::Column::UserId.eq(user_id))
            .order_by_desc(email_verification_tokens::Column::CreatedAt)
            .order_by_desc(email_verification_tokens::Column::Id)
            .one(db)
            .await
            .unwrap()
            .expect("a verification token should exist")
            .token
    }

    /// Parcours navigateur complet, avec le cookie comme transport du token:
    /// register -> login refusé -> verify -> login (cookie posé) -> me ->
    /// logout (cookie effacé) -> me refusé
    #[tokio::test]
    async fn test_session_cookie_lifecycle_over_http() {
        let db = setup_db().await;
        let app = init_app!(&db);

        // Inscription: 201 + needs_verification
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/register",
                serde_json::json!({
                    "name": "Alice",
                    "email": "Alice@X.com",
                    "password": "secret1"
                }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["needs_verification"], true);
        assert_eq!(body["user"]["email"], "alice@x.com");
        let user_id = body["user"]["id"].as_i64().unwrap() as i32;

        // Login avant vérification: 403 avec le flag needs_verification
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/login",
                serde_json::json!({ "email": "alice@x.com", "password": "secret1" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(resp.response().cookies().next().is_none());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "unverified_email");
        assert_eq!(body["needs_verification"], true);

        // Vérification avec le code émis à l'inscription
        let code = latest_code(&db, user_id).await;
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/verify-email",
                serde_json::json!({ "email": "alice@x.com", "code": code }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["email_verified"], true);

        // Login: 200 et cookie de session HttpOnly/Lax de 7 jours
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/login",
                serde_json::json!({ "email": "alice@x.com", "password": "secret1" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .expect("login should set the session cookie")
            .into_owned();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(CookieDuration::days(jwt::SESSION_LIFETIME_DAYS))
        );
        let body: serde_json::Value = test::read_body_json(resp).await;
        // Le corps porte le même token que le cookie (clients non-navigateur)
        assert_eq!(body["token"], cookie.value());
        let token = cookie.value().to_string();

        // /me via le cookie
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .cookie(Cookie::new(AUTH_COOKIE_NAME, token.clone()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["email"], "alice@x.com");

        // /me via le header Authorization (voie non-navigateur)
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        // Logout: 200 et cookie vidé immédiatement (Max-Age 0)
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/logout")
                .cookie(Cookie::new(AUTH_COOKIE_NAME, token.clone()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .expect("logout should clear the session cookie")
            .into_owned();
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(CookieDuration::ZERO));

        // Le token est mort: la session a été supprimée en BD
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .cookie(Cookie::new(AUTH_COOKIE_NAME, token))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_without_token_still_clears_cookie() {
        let db = setup_db().await;
        let app = init_app!(&db);

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/auth/logout").to_request(),
        )
        .await;

        // Être déconnecté est un état: 200 et cookie effacé quand même
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .expect("logout should clear the session cookie")
            .into_owned();
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(CookieDuration::ZERO));
    }

    /// Chaque kind d'erreur sort avec le status et le JSON de la table de §6
    #[tokio::test]
    async fn test_error_kinds_map_to_http_statuses() {
        let db = setup_db().await;
        let app = init_app!(&db);

        // Mot de passe trop court: 400 validation_error
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/register",
                serde_json::json!({ "name": "Alice", "email": "alice@x.com", "password": "short" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");

        // Compte de référence pour la suite
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/register",
                serde_json::json!({ "name": "Alice", "email": "alice@x.com", "password": "secret1" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let user_id = body["user"]["id"].as_i64().unwrap() as i32;

        // Email déjà pris (autre casse): 409 conflict
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/register",
                serde_json::json!({ "name": "Alice Again", "email": "ALICE@X.COM", "password": "another1" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "conflict");

        // Mauvais mot de passe: 401 invalid_credentials
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/login",
                serde_json::json!({ "email": "alice@x.com", "password": "wrong-password" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_credentials");

        // Mauvais code: 400 invalid_code
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/verify-email",
                serde_json::json!({ "email": "alice@x.com", "code": "ZZZZZZ" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_code");

        // Resend pour un email inconnu: 404 not_found
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/resend-verification",
                serde_json::json!({ "email": "ghost@x.com" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "not_found");

        // Resend pour le compte non vérifié: 200, un nouveau code remplace l'ancien
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/resend-verification",
                serde_json::json!({ "email": "alice@x.com" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);

        // Vérifier avec le code issu du resend, puis resend à nouveau:
        // 409 already_verified
        let code = latest_code(&db, user_id).await;
        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/verify-email",
                serde_json::json!({ "email": "alice@x.com", "code": code }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            post_json(
                "/api/auth/resend-verification",
                serde_json::json!({ "email": "alice@x.com" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "already_verified");
    }
}
