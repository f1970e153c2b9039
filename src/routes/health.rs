use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::models::health::HealthResponse;

/// GET /health - État du service, ping BD inclus (PUBLIC)
#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let database_connected = db.get_ref().ping().await.is_ok();

    let response = HealthResponse {
        status: if database_connected { "ok" } else { "degraded" }.to_string(),
        database_connected,
        time: Utc::now(),
    };

    if database_connected {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
