use crate::{
    config::Config,
    error::Result,
    routes::api_routes,
    services::{
        ClubSearchService, Database, DisabledExtractor, EventExtractor, EventParser, EventStore,
        LexiconProvider, LlmExtractor,
    },
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::net::TcpListener;
use std::sync::Arc;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let database = Arc::new(Database::connect(&self.config)?);

        let extractor: Arc<dyn EventExtractor> = if self.config.extraction.is_enabled() {
            Arc::new(LlmExtractor::new(&self.config.extraction)?)
        } else {
            info!("No extraction API key configured, events are parsed by rules only");
            Arc::new(DisabledExtractor)
        };

        let lexicon = Arc::new(LexiconProvider::new(database.clone()));
        let search_service = web::Data::new(ClubSearchService::new(
            database.clone(),
            self.config.search.clone(),
        ));
        let event_parser = web::Data::new(EventParser::new(lexicon, extractor));
        let event_store: Arc<dyn EventStore> = database;
        let event_store = web::Data::from(event_store);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(search_service.clone())
                .app_data(event_parser.clone())
                .app_data(event_store.clone())
                .service(api_routes())
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
