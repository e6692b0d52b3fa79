#[macro_use]
extern crate lazy_static;

use std::sync::Arc;

use actix_files::Files;
use actix_web::web;
use sqlx::SqlitePool;
use tera::Tera;

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod form;
pub mod layout;
pub mod payment;
pub mod routes;
pub mod scroll;
pub mod structs;

use layout::RootLayout;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub layout: Arc<RootLayout>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        AppState {
            db_pool,
            layout: Arc::new(RootLayout::default()),
        }
    }
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera
    };
}

/// Registers every page, API route and the static file service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(api::json_config())
        .service(Files::new("/static", "static"))
        .service(routes::index_handler)
        .service(routes::payment_form_handler)
        .service(routes::payment_form_submit_handler)
        .service(api::list_tenants_handler)
        .service(api::create_tenant_handler)
        .service(api::payment_status_handler)
        .service(api::list_payments_handler)
        .service(api::create_payment_handler);
}
