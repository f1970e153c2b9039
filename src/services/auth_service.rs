// ============================================================================
// SERVICE : AUTHENTIFICATION
// ============================================================================
//
// Description:
//   Logique métier des comptes: inscription, login, vérification d'email,
//   renvoi de code, résolution token -> user, logout. Les handlers HTTP ne
//   font que traduire les résultats en status codes.
//
// Workflow d'un compte:
//   1. register -> user créé (email_verified = false) + code envoyé par email
//   2. verify_email avec le code le plus récent -> email_verified = true
//   3. login -> JWT signé + ligne user_sessions (7 jours)
//   4. get_user_from_token sur chaque requête protégée
//   5. logout -> suppression de la session, le token est mort
//
// Points d'attention:
//   - email normalisé en minuscules avant tout accès BD
//   - login ne révèle jamais si l'email existe (même erreur, même coût)
//   - un login non vérifié échoue TOUJOURS, même avec le bon mot de passe
//   - l'envoi d'email est best-effort: son échec n'annule rien
//
// ============================================================================

use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use validator::Validate;

use crate::errors::AuthError;
use crate::models::dto::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse,
    VerifyEmailRequest,
};
use crate::models::{email_verification_tokens, user_sessions, users};
use crate::services::email_service::{EmailSender, verification_email};
use crate::utils::{jwt, password};

const VERIFICATION_CODE_LENGTH: usize = 6;
const VERIFICATION_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const VERIFICATION_CODE_TTL_MINUTES: i64 = 15;

pub struct AuthService;

impl AuthService {
    /// Crée un compte non vérifié et envoie un code de vérification par email
    pub async fn register(
        db: &DatabaseConnection,
        mailer: &dyn EmailSender,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, AuthError> {
        // 1. Valider les champs avant tout accès BD
        request.validate()?;

        let email = request.email.to_lowercase();

        // 2. Vérifier si l'email est déjà pris (message plus clair que
        //    l'erreur de contrainte; l'index UNIQUE reste le vrai gardien)
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::Conflict);
        }

        // 3. Hash le mot de passe
        let password_hash = password::hash_password(&request.password).map_err(|e| {
            log::error!("Password hashing failed: {}", e);
            AuthError::Internal
        })?;

        // 4. Créer l'utilisateur (une insertion concurrente du même email
        //    perd la course sur l'index UNIQUE et devient un Conflict)
        let now = Utc::now().naive_utc();
        let user = users::ActiveModel {
            name: Set(request.name.clone()),
            email: Set(email),
            password_hash: Set(password_hash),
            email_verified: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        // 5. Générer et stocker le code de vérification (15 minutes)
        let code = Self::generate_verification_code();
        Self::store_verification_code(db, user.id, &code).await?;

        // 6. Envoyer l'email (best-effort)
        Self::dispatch_verification_email(mailer, &user.email, &code).await;

        Ok(RegisterResponse {
            user: user.into(),
            needs_verification: true,
        })
    }

    /// Vérifie les identifiants et ouvre une session de 7 jours
    pub async fn login(
        db: &DatabaseConnection,
        request: LoginRequest,
    ) -> Result<LoginResponse, AuthError> {
        let email = request.email.to_lowercase();

        // 1. Trouver l'utilisateur
        let user = match users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?
        {
            Some(user) => user,
            None => {
                // Brûler un calcul PBKDF2 complet: un email inconnu coûte
                // le même temps qu'un mauvais mot de passe
                let _ = password::hash_password(&request.password);
                return Err(AuthError::InvalidCredentials);
            }
        };

        // 2. Vérifier le mot de passe
        let is_valid = password::verify_password(&request.password, &user.password_hash)
            .map_err(|e| {
                log::error!("Password verification failed for user {}: {}", user.id, e);
                AuthError::Internal
            })?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        // 3. Un compte non vérifié n'obtient jamais de session, même avec
        //    le bon mot de passe
        if !user.email_verified {
            return Err(AuthError::UnverifiedEmail);
        }

        // 4. Générer le JWT et persister la session avec la même expiration
        let token = jwt::generate_token(user.id).map_err(|e| {
            log::error!("Session token generation failed: {}", e);
            AuthError::Internal
        })?;

        let now = Utc::now().naive_utc();
        user_sessions::ActiveModel {
            user_id: Set(user.id),
            session_token: Set(token.clone()),
            expires_at: Set(now + Duration::days(jwt::SESSION_LIFETIME_DAYS)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(LoginResponse {
            user: user.into(),
            token,
        })
    }

    /// Valide un code de vérification et marque l'email comme vérifié.
    /// Seul le code émis en dernier est acceptable; tous les codes du user
    /// sont supprimés après succès.
    pub async fn verify_email(
        db: &DatabaseConnection,
        request: VerifyEmailRequest,
    ) -> Result<UserResponse, AuthError> {
        let email = request.email.to_lowercase();
        let code = request.code.to_uppercase();

        // Un email inconnu répond comme un mauvais code: cet endpoint ne
        // sert pas d'oracle d'existence de comptes
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        // 1. Charger le token le plus récent (les codes plus anciens sont
        //    morts même s'ils correspondent)
        let latest = email_verification_tokens::Entity::find()
            .filter(email_verification_tokens::Column::UserId.eq(user.id))
            .order_by_desc(email_verification_tokens::Column::CreatedAt)
            .order_by_desc(email_verification_tokens::Column::Id)
            .one(db)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        if latest.token != code {
            return Err(AuthError::InvalidCode);
        }
        if Utc::now().naive_utc() > latest.expires_at {
            return Err(AuthError::CodeExpired);
        }

        // 2. Marquer l'email vérifié (idempotent: repasser à true est sans effet)
        let mut active: users::ActiveModel = user.into();
        active.email_verified = Set(true);
        let user = active.update(db).await?;

        // 3. Purger TOUS les codes du user, pas seulement celui qui vient
        //    d'être consommé: aucun rejeu possible
        email_verification_tokens::Entity::delete_many()
            .filter(email_verification_tokens::Column::UserId.eq(user.id))
            .exec(db)
            .await?;

        Ok(user.into())
    }

    /// Invalide les codes existants et envoie un code tout neuf
    pub async fn resend_verification_code(
        db: &DatabaseConnection,
        mailer: &dyn EmailSender,
        email: &str,
    ) -> Result<(), AuthError> {
        let email = email.to_lowercase();

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?
            .ok_or(AuthError::NotFound)?;

        if user.email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        // Supprimer les anciens codes avant d'émettre le nouveau
        email_verification_tokens::Entity::delete_many()
            .filter(email_verification_tokens::Column::UserId.eq(user.id))
            .exec(db)
            .await?;

        let code = Self::generate_verification_code();
        Self::store_verification_code(db, user.id, &code).await?;
        Self::dispatch_verification_email(mailer, &user.email, &code).await;

        Ok(())
    }

    /// Résout un token de session vers son utilisateur.
    /// None = non authentifié (token invalide, session absente ou expirée);
    /// une panne BD remonte en erreur, pas en None.
    pub async fn get_user_from_token(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<Option<UserResponse>, AuthError> {
        // 1. Signature et claims d'abord: un token invalide ne touche pas la BD
        if jwt::verify_token(token).is_err() {
            return Ok(None);
        }

        // 2. La ligne de session doit encore être vivante: un token
        //    structurellement valide mais révoqué/expiré est rejeté ici
        let now = Utc::now().naive_utc();
        let session = user_sessions::Entity::find()
            .filter(user_sessions::Column::SessionToken.eq(token))
            .filter(user_sessions::Column::ExpiresAt.gt(now))
            .one(db)
            .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        let user = users::Entity::find_by_id(session.user_id).one(db).await?;
        Ok(user.map(UserResponse::from))
    }

    /// Supprime la session liée au token (idempotent).
    /// Retourne true si une ligne a réellement été supprimée.
    pub async fn logout(db: &DatabaseConnection, token: &str) -> Result<bool, AuthError> {
        let result = user_sessions::Entity::delete_many()
            .filter(user_sessions::Column::SessionToken.eq(token))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Code à 6 caractères tiré de [A-Z0-9], jamais dérivé d'une entrée user
    fn generate_verification_code() -> String {
        let mut rng = rand::thread_rng();
        (0..VERIFICATION_CODE_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..VERIFICATION_CODE_CHARSET.len());
                VERIFICATION_CODE_CHARSET[idx] as char
            })
            .collect()
    }

    async fn store_verification_code(
        db: &DatabaseConnection,
        user_id: i32,
        code: &str,
    ) -> Result<(), AuthError> {
        let now = Utc::now().naive_utc();
        email_verification_tokens::ActiveModel {
            user_id: Set(user_id),
            token: Set(code.to_string()),
            expires_at: Set(now + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(())
    }

    async fn dispatch_verification_email(mailer: &dyn EmailSender, to: &str, code: &str) {
        let (subject, body) = verification_email(code);
        if let Err(e) = mailer.send(to, &subject, &body).await {
            // L'inscription est déjà commise: on logge et on continue
            log::warn!("Failed to send verification email to {}: {}", to, e);
        }
    }
}
