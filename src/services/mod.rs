pub mod auth;
pub mod comissao;
pub mod session;
