use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Parâmetro obrigatório ausente: {0}")]
    MissingParameter(&'static str),

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Tipo de variante não encontrado")]
    VariantTypeNotFound,

    #[error("Variante não encontrada")]
    VariantNotFound,

    // Duas variantes do mesmo produto nunca podem compartilhar o mesmo
    // mapa de combinações.
    #[error("Combinação de variante duplicada")]
    DuplicateCombination,

    #[error("Combinação inválida: {0}")]
    InvalidCombination(String),

    #[error("Já existe uma variante padrão para este produto")]
    DefaultVariantAlreadyExists,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::MissingParameter(param) => {
                let body = Json(json!({
                    "error": format!("O parâmetro '{}' é obrigatório.", param)
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ProductNotFound => (StatusCode::NOT_FOUND, "Produto não encontrado."),
            AppError::VariantTypeNotFound => (StatusCode::NOT_FOUND, "Tipo de variante não encontrado."),
            AppError::VariantNotFound => (StatusCode::NOT_FOUND, "Variante não encontrada."),
            AppError::DuplicateCombination => {
                (StatusCode::CONFLICT, "Já existe uma variante com esta combinação de opções.")
            }
            AppError::InvalidCombination(detail) => {
                let body = Json(json!({
                    "error": "Combinação de opções inválida.",
                    "details": detail,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::DefaultVariantAlreadyExists => {
                (StatusCode::CONFLICT, "Este produto já possui uma variante padrão.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
