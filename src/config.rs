// src/config.rs

use std::env;
use std::path::PathBuf;

use crate::{
    db::SaleStore,
    services::{auth::AuthService, session::SessionStore},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub store: SaleStore,
    pub sessions: SessionStore,
    pub auth_service: AuthService,
    pub port: u16,
}

impl AppState {
    // Carrega as configurações do ambiente e monta o estado.
    // A assinatura retorna um Result: se a configuração falhar, quem
    // decide abortar é o main.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let data_file: PathBuf = env::var("DATA_FILE")
            .unwrap_or_else(|_| "data.json".to_string())
            .into();
        // Só é usada no primeiro boot, para semear o roster de usuários.
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        Self::montar(data_file, admin_password, bcrypt::DEFAULT_COST, port).await
    }

    // Monta o gráfico de dependências. Separado de `new` para os testes
    // poderem apontar para um arquivo temporário com custo de bcrypt baixo.
    pub async fn montar(
        data_file: PathBuf,
        admin_password: Option<String>,
        bcrypt_cost: u32,
        port: u16,
    ) -> anyhow::Result<Self> {
        let store = SaleStore::new(&data_file);
        store.seed_users_if_needed(admin_password, bcrypt_cost).await?;
        tracing::info!("✅ Arquivo de dados pronto em {}", data_file.display());

        let sessions = SessionStore::new();
        let auth_service = AuthService::new(store.clone(), sessions.clone());

        Ok(Self {
            store,
            sessions,
            auth_service,
            port,
        })
    }
}
