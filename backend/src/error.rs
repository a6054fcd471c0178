//! Error handling for the Veterinary Clinic Management Platform
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Ledger errors
    #[error("Insufficient stock for {lot}: requested {requested}, available {available}")]
    InsufficientStock {
        lot: String,
        requested: i32,
        available: i32,
    },

    #[error("Unknown stock lot: {0}")]
    UnknownLot(String),

    #[error("Originating lot missing: {0}")]
    OriginatingLotMissing(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Receipt line {line} failed: {message}")]
    PartialBatchFailure {
        line: usize,
        message: String,
        message_es: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Catalog service unavailable")]
    CatalogServiceUnavailable,

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InsufficientStock {
                lot,
                requested,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Insufficient stock for {}: requested {}, available {}",
                        lot, requested, available
                    ),
                    message_es: format!(
                        "Existencias insuficientes para {}: solicitado {}, disponible {}",
                        lot, requested, available
                    ),
                    field: None,
                },
            ),
            AppError::UnknownLot(lot) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "UNKNOWN_LOT".to_string(),
                    message_en: format!("Stock lot {} does not exist", lot),
                    message_es: format!("El lote {} no existe", lot),
                    field: None,
                },
            ),
            AppError::OriginatingLotMissing(lot) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "ORIGINATING_LOT_MISSING".to_string(),
                    message_en: format!(
                        "Originating lot {} no longer exists; manual reconciliation required",
                        lot
                    ),
                    message_es: format!(
                        "El lote de origen {} ya no existe; se requiere conciliación manual",
                        lot
                    ),
                    field: None,
                },
            ),
            AppError::InvalidQuantity(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_QUANTITY".to_string(),
                    message_en: msg.clone(),
                    message_es: format!("Cantidad no válida: {}", msg),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::PartialBatchFailure {
                line,
                message,
                message_es,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "PARTIAL_BATCH_FAILURE".to_string(),
                    message_en: format!(
                        "Receipt line {} failed: {}. No lines were applied",
                        line, message
                    ),
                    message_es: format!(
                        "La línea {} del recibo falló: {}. No se aplicó ninguna línea",
                        line, message_es
                    ),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_es,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_es: message_es.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: format!("Datos no válidos: {}", msg),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_es: format!("No se encontró {}", resource),
                    field: None,
                },
            ),
            AppError::CatalogServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "CATALOG_SERVICE_UNAVAILABLE".to_string(),
                    message_en: "Catalog service is temporarily unavailable".to_string(),
                    message_es: "El servicio de catálogo no está disponible temporalmente"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "EXTERNAL_SERVICE_ERROR".to_string(),
                    message_en: format!("External service error: {}", msg),
                    message_es: format!("Error del servicio externo: {}", msg),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_es: format!("Error de configuración: {}", msg),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_es: "Se produjo un error en la base de datos".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
