use crate::{
    error::ApiError,
    models::{ClubListResponse, ClubSearchParams},
    services::ClubSearchService,
};
use actix_web::{web, HttpResponse};

pub fn clubs_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/clubs").route(web::get().to(list_clubs)));
}

/// List clubs, or search them when `q` is given.
///
/// `roles` replaces the configured officer roles for this request only.
/// `tags` and `roles` may be repeated.
pub async fn list_clubs(
    query: web::Query<Vec<(String, String)>>,
    search_service: web::Data<ClubSearchService>,
) -> Result<HttpResponse, ApiError> {
    let params = ClubSearchParams::from_pairs(query.into_inner());
    let tags = params.tag_list();

    let items = match params.role_list() {
        Some(roles) => search_service.search_clubs(&params.q, &roles, &tags).await?,
        None => {
            search_service
                .search_clubs(&params.q, search_service.default_roles(), &tags)
                .await?
        }
    };

    Ok(HttpResponse::Ok().json(ClubListResponse::from(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::services::testing::{candidate, contact, FailingStore, MemoryStore};
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    fn search_service(store: MemoryStore) -> web::Data<ClubSearchService> {
        web::Data::new(ClubSearchService::new(
            Arc::new(store),
            SearchConfig::default(),
        ))
    }

    fn seeded_store() -> MemoryStore {
        let mut finance = candidate("Goizueta Finance Club", 10);
        finance.tags = vec!["finance".to_string()];
        finance
            .contacts
            .push(contact("Priya Raman", "Social Chair", true));

        let mut ai = candidate("AI Society", 0);
        ai.tags = vec!["tech".to_string()];
        ai.contacts.push(contact("Hidden Person", "president", false));

        MemoryStore::default()
            .with_candidate(finance)
            .with_candidate(ai)
    }

    #[actix_web::test]
    async fn test_listing_without_query() {
        let app = test::init_service(
            App::new()
                .app_data(search_service(seeded_store()))
                .configure(clubs_config),
        )
        .await;

        let request = test::TestRequest::get().uri("/clubs").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body["total"], 2);
        assert_eq!(body["items"][0]["name"], "AI Society");
        assert_eq!(body["items"][0]["verifiedContacts"], serde_json::json!([]));
        assert_eq!(body["items"][1]["name"], "Goizueta Finance Club");
    }

    #[actix_web::test]
    async fn test_tag_filter_and_fuzzy_query() {
        let app = test::init_service(
            App::new()
                .app_data(search_service(seeded_store()))
                .configure(clubs_config),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/clubs?q=goizeuta&tags=finance")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["total"], 0);

        // the pre-filter needs an exact substring, so a typo alone finds nothing,
        // but a correctly spelled second word lets the typo match the name
        let request = test::TestRequest::get()
            .uri("/clubs?q=goizeuta%20finance&tags=finance")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["tags"], serde_json::json!(["finance"]));
    }

    #[actix_web::test]
    async fn test_repeated_tags_parameter() {
        let app = test::init_service(
            App::new()
                .app_data(search_service(seeded_store()))
                .configure(clubs_config),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/clubs?tags=finance&tags=tech")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["total"], 2);

        let request = test::TestRequest::get()
            .uri("/clubs?tags=tech&tags=music")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["name"], "AI Society");
    }

    #[actix_web::test]
    async fn test_roles_parameter_overrides_configured_roles() {
        let app = test::init_service(
            App::new()
                .app_data(search_service(seeded_store()))
                .configure(clubs_config),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/clubs?q=priya%20raman")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["total"], 0);

        let request = test::TestRequest::get()
            .uri("/clubs?q=priya%20raman&roles=social%20chair")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["verifiedContacts"][0]["name"], "Priya Raman");
    }

    #[actix_web::test]
    async fn test_store_failure() {
        let service = web::Data::new(ClubSearchService::new(
            Arc::new(FailingStore),
            SearchConfig::default(),
        ));
        let app =
            test::init_service(App::new().app_data(service).configure(clubs_config)).await;

        // searching degrades to an empty result
        let request = test::TestRequest::get().uri("/clubs?q=finance").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["total"], 0);

        // the plain listing reports the outage
        let request = test::TestRequest::get().uri("/clubs").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
