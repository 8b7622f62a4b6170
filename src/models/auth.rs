// src/models/auth.rs

use serde::{Deserialize, Serialize};

// Papéis fixos do sistema. O `admin` enxerga e administra tudo;
// o `consultor` só enxerga as próprias vendas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Consultor,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// Representa um usuário como persistido no arquivo de dados. O hash
// PRECISA ser serializado aqui (é assim que ele chega ao data.json);
// a redação acontece na borda da API, via `UserPublic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub password_hash: String,
}

// Visão pública de um usuário: o que GET /api/users devolve.
// Sem campo de senha, por construção.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            role: user.role,
        }
    }
}

// Identidade resolvida de uma sessão ativa; é o que o middleware
// injeta nas extensions da requisição.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub user_id: String,
    pub role: Role,
    pub name: String,
    pub username: String,
}

// Dados para login. Campos vazios não são erro de validação: caem na
// busca de usuário e voltam como credenciais inválidas (401), igual a
// qualquer outro login errado.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// Resposta de login bem-sucedido
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub role: Role,
    pub name: String,
    pub username: String,
}
