// ============================================================================
// MODÈLE : CODES DE VÉRIFICATION EMAIL
// ============================================================================
//
// Description:
//   Table email_verification_tokens. Chaque ligne est un code à 6 caractères
//   envoyé par email après l'inscription, à durée de vie courte.
//
// Colonnes:
//   - id : SERIAL PRIMARY KEY
//   - user_id : FK vers users, NOT NULL
//   - token : VARCHAR NOT NULL, 6 caractères alphanumériques majuscules
//   - expires_at : TIMESTAMP NOT NULL, created_at + 15 minutes
//   - created_at : TIMESTAMP NOT NULL
//
// Workflow:
//   1. register crée le compte (email_verified = false), tire un code et
//      l'insère ici, puis l'envoie par email
//   2. verify-email compare le code soumis au token LE PLUS RÉCENT du user
//      (created_at desc, puis id desc) et contrôle l'expiration
//   3. succès -> users.email_verified = true et purge de toutes les lignes
//      du user: aucun rejeu possible
//
// Points d'attention:
//   - plusieurs lignes par user peuvent coexister (resend); seule la plus
//     récente est acceptable, les autres sont du poids mort
//   - token n'est PAS unique: deux users peuvent tirer le même code
//   - un code consommé est supprimé, jamais marqué "utilisé"
//   - la FK est en ON DELETE CASCADE côté SQL
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub token: String,

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
