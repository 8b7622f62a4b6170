// src/models/sales.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::auth::User;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParcelaStatus {
    Pago,
    Pendente,
    Atrasado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseComissao {
    Venda,   // comissão sobre o valor de venda
    Credito, // comissão sobre o crédito (pós-teto)
}

// --- Structs ---

// Uma venda como persistida no arquivo de dados (e devolvida pela API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,

    // Dono da venda; imutável para não-admins.
    pub user_id: String,

    // Snapshot do nome de exibição do consultor no momento da venda.
    pub consultor_name: String,

    pub cliente: String,
    pub produto: String,

    // Data em texto livre, como o formulário envia.
    pub data: String,

    pub seguro: String, // "Sim" | "Não"

    pub cotas: u64,
    pub valor_unit: f64,
    pub valor_venda: f64,
    pub base_comissao: BaseComissao,
    pub taxa_pct: f64,

    // Campos derivados pelo calculador (ver services::comissao).
    pub credito_raw: f64,
    pub credito: f64,
    pub comissao_total: f64,

    // Sempre exatamente 6 parcelas.
    pub parcelas: Vec<ParcelaStatus>,

    pub created_at: String,
    pub updated_at: String,
}

// O documento inteiro do data.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Documento {
    pub users: Vec<User>,
    pub sales: Vec<Sale>,
}

// Payload bruto de criação/edição/preview de venda. Os campos numéricos
// chegam como número OU string formatada ("1.500,50"), então ficam como
// `Value` e passam pelo parse tolerante do calculador. A validação de
// obrigatórios roda sobre os valores já normalizados (ver handlers).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    #[serde(default)]
    pub cliente: String,

    #[serde(default)]
    pub produto: String,

    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub seguro: Option<String>,

    #[serde(default)]
    pub cotas: Option<Value>,
    #[serde(default)]
    pub valor_unit: Option<Value>,
    #[serde(default)]
    pub valor_venda: Option<Value>,
    #[serde(default)]
    pub base_comissao: Option<String>,
    #[serde(default)]
    pub taxa_pct: Option<Value>,

    #[serde(default)]
    pub parcelas: Option<Vec<String>>,

    // Somente admins podem usar estes dois para atribuir a venda
    // a outro consultor; ignorados para os demais.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub consultor_name: Option<String>,
}
