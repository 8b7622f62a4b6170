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

    #[error("Não autenticado")]
    NaoAutenticado,

    #[error("Acesso negado")]
    AcessoNegado,

    #[error("Credenciais inválidas")]
    CredenciaisInvalidas,

    #[error("Venda não encontrada")]
    VendaNaoEncontrada,

    // O arquivo de dados existe mas não é um JSON válido. Nunca é
    // "consertado" sobrescrevendo: falha alto para não perder vendas.
    #[error("Arquivo de dados corrompido: {0}")]
    DadosCorrompidos(String),

    #[error("Erro de I/O")]
    Io(#[from] std::io::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
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
                    let messages: Vec<String> = field_errors
                        .iter()
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
            AppError::NaoAutenticado => (StatusCode::UNAUTHORIZED, "Não autenticado"),
            AppError::AcessoNegado => (StatusCode::FORBIDDEN, "Acesso negado"),
            AppError::CredenciaisInvalidas => {
                (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos")
            }
            AppError::VendaNaoEncontrada => (StatusCode::NOT_FOUND, "Venda não encontrada"),

            // Todos os outros erros (Io, DadosCorrompidos, ...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu;
            // o cliente só recebe o texto genérico.
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
