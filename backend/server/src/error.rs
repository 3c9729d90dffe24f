use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::database::StoreError;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Please provide the correct ?key= in the URL";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Order not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No free reference after {0} attempts")]
    ReferenceExhausted(usize),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ReferenceExhausted(_) | AppError::Store(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(message) => message.clone(),
            AppError::NotFound => "Order not found".to_string(),
            AppError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            AppError::ReferenceExhausted(_) | AppError::Store(_) | AppError::Template(_) => {
                error!("{self}");
                "Internal server error".to_string()
            }
        };

        (status, body).into_response()
    }
}
