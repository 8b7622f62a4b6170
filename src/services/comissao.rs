// src/services/comissao.rs
//
// O calculador de comissões. É uma função pura, compartilhada entre o
// caminho de persistência (POST/PUT de vendas) e o preview interativo
// do painel (POST /api/sales/preview) — os dois caminhos produzem
// exatamente os mesmos números por construção.

use serde::Serialize;
use serde_json::Value;

use crate::models::sales::{BaseComissao, ParcelaStatus, SaleInput};

// Teto regulatório de crédito por venda.
pub const LIMITE_CREDITO: f64 = 1_500_000.0;

pub const NUM_PARCELAS: usize = 6;

/// Converte um valor vindo do formulário em número.
///
/// Aceita números JSON e strings no formato brasileiro ("1.500,50":
/// ponto de milhar, vírgula decimal). Qualquer coisa não numérica ou
/// não finita degrada para 0.
pub fn parse_num(v: Option<&Value>) -> f64 {
    let Some(v) = v else { return 0.0 };
    match v {
        Value::Number(n) => {
            let n = n.as_f64().unwrap_or(0.0);
            if n.is_finite() { n } else { 0.0 }
        }
        Value::String(s) => {
            let normalizado = s.trim().replace('.', "").replace(',', ".");
            match normalizado.parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => 0.0,
            }
        }
        _ => 0.0,
    }
}

/// Aplica o teto de crédito: nunca negativo, nunca acima do limite.
pub fn clamp_credito(raw: f64) -> f64 {
    raw.max(0.0).min(LIMITE_CREDITO)
}

// Resultado do calculador: entrada normalizada + campos derivados.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendaCalculada {
    pub cliente: String,
    pub produto: String,
    pub data: String,
    pub seguro: String,
    pub cotas: u64,
    pub valor_unit: f64,
    pub valor_venda: f64,
    pub base_comissao: BaseComissao,
    pub taxa_pct: f64,
    pub credito_raw: f64,
    pub credito: f64,
    pub comissao_total: f64,
    pub parcela_valor: f64,
    pub parcelas: Vec<ParcelaStatus>,
    pub pago_count: usize,
    pub pendente_count: usize,
    pub atrasado_count: usize,
}

/// Normaliza a entrada bruta de uma venda e deriva crédito, comissão e
/// o cronograma de 6 parcelas.
pub fn normalizar(input: &SaleInput) -> VendaCalculada {
    let cotas = parse_num(input.cotas.as_ref()).max(0.0).floor() as u64;
    let valor_unit = parse_num(input.valor_unit.as_ref()).max(0.0);
    let valor_venda = parse_num(input.valor_venda.as_ref()).max(0.0);
    let taxa_pct = parse_num(input.taxa_pct.as_ref()); // sem clamp, pode ser negativa

    let seguro = match input.seguro.as_deref() {
        Some("Sim") => "Sim",
        _ => "Não",
    };

    let base_comissao = match input.base_comissao.as_deref() {
        Some("venda") => BaseComissao::Venda,
        _ => BaseComissao::Credito,
    };

    let credito_raw = cotas as f64 * valor_unit;
    let credito = clamp_credito(credito_raw);

    let base = match base_comissao {
        BaseComissao::Venda => valor_venda,
        BaseComissao::Credito => credito,
    };
    let comissao_total = base * (taxa_pct / 100.0);
    let parcela_valor = comissao_total / NUM_PARCELAS as f64;

    // Exatamente 6 parcelas, sempre. Status desconhecido vira Pendente;
    // lista de tamanho errado vira tudo Pendente.
    let parcelas: Vec<ParcelaStatus> = match input.parcelas.as_deref() {
        Some(lista) if lista.len() == NUM_PARCELAS => lista
            .iter()
            .map(|s| match s.as_str() {
                "Pago" => ParcelaStatus::Pago,
                "Atrasado" => ParcelaStatus::Atrasado,
                _ => ParcelaStatus::Pendente,
            })
            .collect(),
        _ => vec![ParcelaStatus::Pendente; NUM_PARCELAS],
    };

    let pago_count = parcelas.iter().filter(|p| **p == ParcelaStatus::Pago).count();
    let atrasado_count = parcelas
        .iter()
        .filter(|p| **p == ParcelaStatus::Atrasado)
        .count();
    let pendente_count = NUM_PARCELAS - pago_count - atrasado_count;

    VendaCalculada {
        cliente: input.cliente.trim().to_string(),
        produto: input.produto.trim().to_string(),
        data: input.data.trim().to_string(),
        seguro: seguro.to_string(),
        cotas,
        valor_unit,
        valor_venda,
        base_comissao,
        taxa_pct,
        credito_raw,
        credito,
        comissao_total,
        parcela_valor,
        parcelas,
        pago_count,
        pendente_count,
        atrasado_count,
    }
}
