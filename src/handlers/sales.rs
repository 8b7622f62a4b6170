// src/handlers/sales.rs

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::SessionIdentity,
        sales::{Sale, SaleInput},
    },
    services::comissao::{self, VendaCalculada},
};

// Validação de negócio sobre a entrada já normalizada (os campos de
// texto chegam trimados do calculador).
fn validar_venda(calc: &VendaCalculada) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();

    let mut exigir = |campo: &'static str, ok: bool, msg: &'static str| {
        if !ok {
            let mut erro = ValidationError::new("required");
            erro.message = Some(msg.into());
            errors.add(campo.into(), erro);
        }
    };

    exigir("cliente", !calc.cliente.is_empty(), "Preencha o cliente.");
    exigir("produto", !calc.produto.is_empty(), "Preencha o produto.");
    exigir("data", !calc.data.is_empty(), "Preencha a data.");
    exigir("cotas", calc.cotas > 0, "Informe cotas (> 0).");
    exigir(
        "valorUnit",
        calc.valor_unit > 0.0,
        "Informe o valor unitário (> 0).",
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

// Dono e nome de exibição da venda: admin pode atribuir a qualquer
// consultor; os demais sempre gravam em nome próprio.
fn resolver_dono(
    me: &SessionIdentity,
    payload: &SaleInput,
    fallback: (&str, &str),
) -> (String, String) {
    let (user_id_atual, nome_atual) = fallback;
    if me.role.is_admin() {
        let user_id = payload
            .user_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(user_id_atual)
            .to_string();
        let nome = payload
            .consultor_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(nome_atual)
            .to_string();
        (user_id, nome)
    } else {
        (me.user_id.clone(), me.name.clone())
    }
}

fn agora() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// GET /api/sales
pub async fn list_sales(
    State(app_state): State<AppState>,
    AuthenticatedUser(me): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let rows = app_state.store.list_sales_for(me.role, &me.user_id).await?;
    Ok(Json(json!({ "ok": true, "rows": rows })))
}

// POST /api/sales/preview
//
// O preview interativo do painel: roda o MESMO calculador do caminho de
// persistência e devolve os campos derivados, sem gravar nada.
pub async fn preview_sale(
    _user: AuthenticatedUser,
    Json(payload): Json<SaleInput>,
) -> Json<Value> {
    let calc = comissao::normalizar(&payload);
    Json(json!({ "ok": true, "preview": calc }))
}

// POST /api/sales
pub async fn create_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(me): AuthenticatedUser,
    Json(payload): Json<SaleInput>,
) -> Result<Json<Value>, AppError> {
    let calc = comissao::normalizar(&payload);
    validar_venda(&calc)?;

    let (user_id, consultor_name) =
        resolver_dono(&me, &payload, (me.user_id.as_str(), me.name.as_str()));

    let id = Uuid::new_v4().to_string();
    let ts = agora();
    let sale = Sale {
        id: id.clone(),
        user_id,
        consultor_name,
        cliente: calc.cliente,
        produto: calc.produto,
        data: calc.data,
        seguro: calc.seguro,
        cotas: calc.cotas,
        valor_unit: calc.valor_unit,
        valor_venda: calc.valor_venda,
        base_comissao: calc.base_comissao,
        taxa_pct: calc.taxa_pct,
        credito_raw: calc.credito_raw,
        credito: calc.credito,
        comissao_total: calc.comissao_total,
        parcelas: calc.parcelas,
        created_at: ts.clone(),
        updated_at: ts,
    };

    app_state.store.create_sale(sale).await?;
    Ok(Json(json!({ "ok": true, "id": id })))
}

// PUT /api/sales/{id}
pub async fn update_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(me): AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<SaleInput>,
) -> Result<Json<Value>, AppError> {
    let calc = comissao::normalizar(&payload);
    validar_venda(&calc)?;

    // Autorização e mutação rodam dentro do transform, sob o mesmo
    // lock do store: primeiro o dono do registro ATUAL, depois a
    // reescrita. Recusa = nada gravado.
    app_state
        .store
        .update_sale(&id, |existente| {
            if !me.role.is_admin() && existente.user_id != me.user_id {
                return Err(AppError::AcessoNegado);
            }
            let (user_id, consultor_name) = resolver_dono(
                &me,
                &payload,
                (existente.user_id.as_str(), existente.consultor_name.as_str()),
            );
            Ok(Sale {
                id: existente.id.clone(),
                user_id,
                consultor_name,
                cliente: calc.cliente.clone(),
                produto: calc.produto.clone(),
                data: calc.data.clone(),
                seguro: calc.seguro.clone(),
                cotas: calc.cotas,
                valor_unit: calc.valor_unit,
                valor_venda: calc.valor_venda,
                base_comissao: calc.base_comissao,
                taxa_pct: calc.taxa_pct,
                credito_raw: calc.credito_raw,
                credito: calc.credito,
                comissao_total: calc.comissao_total,
                parcelas: calc.parcelas.clone(),
                created_at: existente.created_at.clone(),
                updated_at: agora(),
            })
        })
        .await?;

    Ok(Json(json!({ "ok": true })))
}

// DELETE /api/sales/{id}
pub async fn delete_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(me): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    // Mesma ordem do update: autoriza contra o registro atual e só
    // então apaga, tudo sob o lock do store.
    app_state
        .store
        .delete_sale(&id, |atual| {
            if !me.role.is_admin() && atual.user_id != me.user_id {
                return Err(AppError::AcessoNegado);
            }
            Ok(())
        })
        .await?;
    Ok(Json(json!({ "ok": true })))
}
