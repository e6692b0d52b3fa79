use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    middleware,
    web::{self, Data},
    App, HttpServer,
};
use log::info;

use rentall::{config::Config, db, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("FATAL: {}", e);
        e
    })?;

    let db_pool = db::connect(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    db::migrate(&db_pool).await?;
    info!("Database migrated successfully");

    let state = AppState::new(db_pool);
    let session_key = config.session_key();
    let cookie_secure = config.cookie_secure;

    info!(
        "Starting HTTP server on http://{}:{}/",
        config.host, config.port
    );

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(cookie_secure)
                    .build(),
            )
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .app_data(Data::new(state.clone()))
            .configure(rentall::configure)
            .default_service(web::to(routes::default_handler))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
