// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use vendas_backend::{build_router, config::AppState};

#[tokio::main]
async fn main() {
    // Inicializa o logger. RUST_LOG manda; sem ele, um padrão sensato.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vendas_backend=debug,tower_http=info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não
    // deve iniciar (inclusive com data.json corrompido — nunca
    // sobrescrevemos um arquivo ilegível).
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    let port = app_state.port;
    let app = build_router(app_state);

    // Inicia o servidor
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
