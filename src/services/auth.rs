// src/services/auth.rs

use bcrypt::verify;

use crate::{
    common::error::AppError,
    db::SaleStore,
    models::auth::SessionIdentity,
    services::session::SessionStore,
};

#[derive(Clone)]
pub struct AuthService {
    store: SaleStore,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(store: SaleStore, sessions: SessionStore) -> Self {
        Self { store, sessions }
    }

    /// Valida as credenciais e, em caso de sucesso, cria a sessão.
    /// Devolve a identidade e o token que vai no cookie.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(SessionIdentity, String), AppError> {
        // Username é case-insensitive no login.
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(AppError::CredenciaisInvalidas)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado; bcrypt já compara
        // em tempo constante.
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::CredenciaisInvalidas);
        }

        let identity = SessionIdentity {
            user_id: user.id,
            role: user.role,
            name: user.display_name,
            username: user.username,
        };
        let token = self.sessions.create(identity.clone());
        Ok((identity, token))
    }

    pub fn resolve_session(&self, token: &str) -> Option<SessionIdentity> {
        self.sessions.resolve(token)
    }

    pub fn logout(&self, token: &str) {
        self.sessions.destroy(token);
    }
}
