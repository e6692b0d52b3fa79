use std::str::FromStr;

use rentall::{db, structs::NewTenant, structs::Tenant, AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Builds the full application around `$state`, the same way `main` does.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::generate(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(rentall::configure)
                .default_service(actix_web::web::to(rentall::routes::default_handler)),
        )
        .await
    };
}

pub async fn state() -> AppState {
    // a single connection keeps every query on the same in-memory database
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    db::migrate(&pool).await.unwrap();
    AppState::new(pool)
}

pub async fn tenant(state: &AppState, name: &str, unit: Option<&str>, rent: i64) -> Tenant {
    db::create_tenant(
        state,
        NewTenant {
            full_name: name.to_owned(),
            unit_name: unit.map(str::to_owned),
            rent_amount_kes: rent,
        },
    )
    .await
    .unwrap()
}
