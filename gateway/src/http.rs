use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web::{self, Data},
    App, HttpServer,
};
use thiserror::Error;

use replygate_core::model::{ClassifierClient, GenerationClient, GroqClient, OllamaClient};
use replygate_core::session::SessionStore;

use crate::config::Config;
use crate::handler::chat::chat_handler;
use crate::handler::health::health_handler;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Actix(#[from] std::io::Error),
}

/// Shared per-process state handed to the route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub generation: Arc<dyn GenerationClient>,
    pub classifier: Arc<dyn ClassifierClient>,
    pub ollama: OllamaClient,
    pub sessions: Arc<SessionStore>,
}

#[derive(Clone)]
pub struct ApiServer {
    config: Config,
}

impl ApiServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn start(self) -> Result<(), ServerError> {
        let ollama = OllamaClient::new(self.config.ollama.endpoint());
        let generation = GroqClient::new(
            self.config.generation.api_url.clone(),
            self.config.generation.model(),
        );

        let state = AppState {
            config: self.config.clone(),
            generation: Arc::new(generation),
            classifier: Arc::new(ollama.clone()),
            ollama,
            sessions: Arc::new(SessionStore::new()),
        };

        let host = self.config.http.host.clone();
        let port = self.config.http.port;
        tracing::info!(host = %host, port, "http server ready");

        HttpServer::new(move || {
            let cors = Self::get_cors(&state.config.http.cors_allowed_origins);
            Self::create_app_entry(cors, state.clone())
        })
        .bind((host.as_str(), port))?
        .run()
        .await
        .map_err(ServerError::Actix)
    }

    fn create_app_entry(
        cors: Cors,
        state: AppState,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Response = ServiceResponse<impl MessageBody>,
            Config = (),
            InitError = (),
            Error = actix_web::Error,
        >,
    > {
        App::new()
            .app_data(Data::new(state))
            .wrap(cors)
            .route("/chat", web::post().to(chat_handler))
            .route("/health", web::get().to(health_handler))
    }

    fn get_cors(origins: &[String]) -> Cors {
        if origins.iter().any(|origin| origin == "*") {
            Cors::permissive()
        } else {
            origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        }
    }
}
