use crate::{
    error::ApiError,
    models::{CreatedResponse, ExtractedEvent, ParseEventRequest},
    services::{EventParser, EventStore},
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use log::info;

pub fn events_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/events/parse").route(web::post().to(parse_event)))
        .service(web::resource("/events").route(web::post().to(create_event)));
}

/// Turn free text into a structured event without saving it.
pub async fn parse_event(
    request: Json<ParseEventRequest>,
    parser: web::Data<EventParser>,
) -> Result<HttpResponse, ApiError> {
    let event = parser.parse_event(&request.text).await;
    Ok(HttpResponse::Ok().json(event))
}

pub async fn create_event(
    event: Json<ExtractedEvent>,
    store: web::Data<dyn EventStore>,
) -> Result<HttpResponse, ApiError> {
    event.validate()?;

    let id = store.create_event(&event).await?;
    info!("Event '{}' stored as {}", event.title, id);

    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}
