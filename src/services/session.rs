// src/services/session.rs

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rand::RngCore;

use crate::models::auth::SessionIdentity;

// Armazenamento de sessões em memória, vivo enquanto o processo viver.
// É injetado via AppState (nada de estado global de módulo); trocar por
// um armazenamento externo significa trocar só esta struct.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionIdentity>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria uma sessão para a identidade e devolve o token opaco.
    pub fn create(&self, identity: SessionIdentity) -> String {
        let token = gerar_token();
        self.inner
            .write()
            .expect("lock de sessões envenenado")
            .insert(token.clone(), identity);
        token
    }

    /// Resolve um token para a identidade, se a sessão existir.
    pub fn resolve(&self, token: &str) -> Option<SessionIdentity> {
        self.inner
            .read()
            .expect("lock de sessões envenenado")
            .get(token)
            .cloned()
    }

    /// Destrói a sessão (logout). Token desconhecido é um no-op.
    pub fn destroy(&self, token: &str) {
        self.inner
            .write()
            .expect("lock de sessões envenenado")
            .remove(token);
    }
}

// 32 bytes aleatórios em hex: entropia alta o suficiente para o token
// ser inadivinhável.
fn gerar_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    fn identidade() -> SessionIdentity {
        SessionIdentity {
            user_id: "u_pedro".into(),
            role: Role::Consultor,
            name: "Pedro".into(),
            username: "pedro".into(),
        }
    }

    #[test]
    fn ciclo_de_vida_da_sessao() {
        let store = SessionStore::new();
        let token = store.create(identidade());

        let resolvida = store.resolve(&token).expect("sessão ativa");
        assert_eq!(resolvida.user_id, "u_pedro");

        store.destroy(&token);
        assert!(store.resolve(&token).is_none());
    }

    #[test]
    fn token_desconhecido_nao_resolve() {
        let store = SessionStore::new();
        assert!(store.resolve("deadbeef").is_none());
    }

    #[test]
    fn tokens_sao_unicos_e_longos() {
        let store = SessionStore::new();
        let a = store.create(identidade());
        let b = store.create(identidade());
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
