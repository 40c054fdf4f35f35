use actix_web::{web, Scope};

use crate::handlers::{clubs_config, events_config, health_check};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .configure(clubs_config)
        .configure(events_config)
}
