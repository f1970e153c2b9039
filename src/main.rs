mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};

use crate::services::email_service::{ConsoleEmailSender, EmailSender};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("🔌 Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    // L'envoi réel (SMTP) se branche ici; en dev les emails partent dans les logs
    let mailer: Arc<dyn EmailSender> = Arc::new(ConsoleEmailSender);
    println!("📧 Using console email sender (verification codes go to the logs)");

    println!("🚀 Starting server on http://127.0.0.1:8080");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::from(mailer.clone()))
            .configure(routes::configure_routes)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
