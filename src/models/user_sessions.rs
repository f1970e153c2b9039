// ============================================================================
// MODÈLE : USER SESSIONS
// ============================================================================
//
// Description:
//   Modèle de la table user_sessions. Chaque ligne est une session active:
//   le JWT signé sert de clé de recherche. Un token structurellement valide
//   sans ligne de session vivante est rejeté (révocation côté serveur).
//
// Colonnes:
//   - id : SERIAL PRIMARY KEY
//   - user_id : FK vers users, NOT NULL
//   - session_token : VARCHAR NOT NULL, le JWT lui-même (clé de recherche)
//   - expires_at : TIMESTAMP NOT NULL, created_at + 7 jours
//   - created_at : TIMESTAMP NOT NULL
//
// Workflow:
//   1. Login réussi -> JWT signé + insertion d'une ligne ici (expiry 7 jours)
//   2. Chaque requête authentifiée vérifie le JWT PUIS la ligne de session
//      (session_token correspond ET expires_at > now)
//   3. Logout -> suppression de la ligne, le JWT devient inutilisable
//
// Points d'attention:
//   - Pas de purge en arrière-plan: les lignes expirées sont simplement
//     ignorées par les requêtes (filtre sur expires_at)
//   - session_token n'a pas de contrainte UNIQUE: deux logins du même user
//     dans la même seconde produisent le même JWT, les deux lignes restent
//     valables et logout les supprime ensemble
//   - ON DELETE CASCADE: si user supprimé, sessions supprimées aussi
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub session_token: String,

    pub expires_at: DateTime,

    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
