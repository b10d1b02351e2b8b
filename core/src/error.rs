use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::model::error::ModelError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("message is required")]
    EmptyMessage,
    #[error("message too long (max {0} characters)")]
    MessageTooLong(usize),
    #[error(transparent)]
    ModelError(#[from] ModelError),
    #[error(transparent)]
    StdIOError(#[from] std::io::Error),
    #[error(transparent)]
    ParseError(#[from] serde_json::Error),
    #[error("{0}")]
    CustomError(String),
}

impl actix_web::error::ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        tracing::error!("API error: {:?}", self);
        let json_error = json!({
            "error": self.to_string(),
        });

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json_error)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::EmptyMessage | GatewayError::MessageTooLong(_) => StatusCode::BAD_REQUEST,
            GatewayError::ModelError(ModelError::Auth(_)) => StatusCode::UNAUTHORIZED,
            GatewayError::ModelError(ModelError::MissingApiKey(_)) => StatusCode::UNAUTHORIZED,
            GatewayError::ModelError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
