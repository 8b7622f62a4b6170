// src/db/sale_store.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    models::{
        auth::{Role, User},
        sales::{Documento, Sale},
    },
};

// O repositório de usuários e vendas, responsável por todas as
// interações com o arquivo de dados (um único documento JSON).
//
// Todo ciclo ler-modificar-gravar roda sob o mutex: um escritor por
// vez, nada de updates perdidos entre requisições concorrentes. A
// gravação escreve num .tmp ao lado e renomeia por cima, então o
// arquivo nunca fica truncado no meio de um write.
#[derive(Clone)]
pub struct SaleStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl SaleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    // --- Acesso bruto ao documento (sempre chamar com o lock em mãos) ---

    async fn read_doc(&self) -> Result<Documento, AppError> {
        if !tokio::fs::try_exists(&self.path).await? {
            // Primeira execução: cria o documento vazio.
            let doc = Documento::default();
            self.write_doc(&doc).await?;
            return Ok(doc);
        }
        let raw = tokio::fs::read_to_string(&self.path).await?;
        // Arquivo presente mas ilegível NÃO é substituído por um
        // documento vazio: isso apagaria todas as vendas.
        serde_json::from_str(&raw).map_err(|e| AppError::DadosCorrompidos(e.to_string()))
    }

    async fn write_doc(&self, doc: &Documento) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| anyhow::anyhow!("falha ao serializar documento: {e}"))?;
        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    // --- Operações ---

    pub async fn load(&self) -> Result<Documento, AppError> {
        let _guard = self.lock.lock().await;
        self.read_doc().await
    }

    /// Popula o elenco fixo de usuários na primeira execução.
    /// No-op se o documento já tiver qualquer usuário.
    pub async fn seed_users_if_needed(
        &self,
        admin_password: Option<String>,
        bcrypt_cost: u32,
    ) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_doc().await?;
        if !doc.users.is_empty() {
            return Ok(());
        }

        let senha_admin = admin_password.unwrap_or_else(|| "victor é lindo".to_string());

        // bcrypt é caro; roda fora do executor async.
        let hashes = tokio::task::spawn_blocking(move || {
            let admin = bcrypt::hash(&senha_admin, bcrypt_cost)?;
            let consultor = bcrypt::hash("1234", bcrypt_cost)?;
            Ok::<_, bcrypt::BcryptError>((admin, consultor))
        })
        .await
        .map_err(|e| anyhow::anyhow!("falha na task de hashing: {e}"))??;
        let (hash_admin, hash_consultor) = hashes;

        let consultor = |id: &str, username: &str, nome: &str| User {
            id: id.to_string(),
            username: username.to_string(),
            display_name: nome.to_string(),
            role: Role::Consultor,
            password_hash: hash_consultor.clone(),
        };

        doc.users = vec![
            User {
                id: "u_admin".into(),
                username: "admin".into(),
                display_name: "Administrador".into(),
                role: Role::Admin,
                password_hash: hash_admin,
            },
            consultor("u_graziele", "graziele", "Graziele"),
            consultor("u_pedro", "pedro", "Pedro"),
            consultor("u_gustavo", "gustavo", "Gustavo"),
            consultor("u_poli", "poli", "Poli"),
            consultor("u_victor", "victor", "Victor"),
        ];
        doc.sales = vec![];

        self.write_doc(&doc).await?;
        tracing::info!("👥 Usuários iniciais criados ({})", doc.users.len());
        Ok(())
    }

    /// Busca um usuário pelo username (comparação case-insensitive).
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let _guard = self.lock.lock().await;
        let doc = self.read_doc().await?;
        let alvo = username.to_lowercase();
        Ok(doc
            .users
            .into_iter()
            .find(|u| u.username.to_lowercase() == alvo))
    }

    /// Lista todos os usuários, com hash e tudo. A redação para a API
    /// é responsabilidade do handler (ver `UserPublic`).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_doc().await?.users)
    }

    /// Vendas visíveis para o chamador: todas para admin, só as
    /// próprias para consultor.
    pub async fn list_sales_for(&self, role: Role, user_id: &str) -> Result<Vec<Sale>, AppError> {
        let _guard = self.lock.lock().await;
        let doc = self.read_doc().await?;
        if role.is_admin() {
            return Ok(doc.sales);
        }
        Ok(doc
            .sales
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect())
    }

    /// Insere a venda no topo da lista (mais recente primeiro).
    pub async fn create_sale(&self, sale: Sale) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_doc().await?;
        doc.sales.insert(0, sale);
        self.write_doc(&doc).await
    }

    /// Aplica `transform` à venda existente, preservando a posição.
    ///
    /// O transform pode recusar (ex.: chamador não é o dono); a recusa
    /// roda sob o MESMO lock da mutação, então não existe janela entre
    /// autorizar e gravar. Em caso de `Err`, nada é escrito.
    pub async fn update_sale<F>(&self, id: &str, transform: F) -> Result<Sale, AppError>
    where
        F: FnOnce(&Sale) -> Result<Sale, AppError>,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_doc().await?;
        let Some(idx) = doc.sales.iter().position(|s| s.id == id) else {
            return Err(AppError::VendaNaoEncontrada);
        };
        let atualizada = transform(&doc.sales[idx])?;
        doc.sales[idx] = atualizada.clone();
        self.write_doc(&doc).await?;
        Ok(atualizada)
    }

    /// Apaga a venda, consultando `autorizar` contra o registro atual
    /// sob o mesmo lock da remoção.
    pub async fn delete_sale<F>(&self, id: &str, autorizar: F) -> Result<(), AppError>
    where
        F: FnOnce(&Sale) -> Result<(), AppError>,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_doc().await?;
        let Some(idx) = doc.sales.iter().position(|s| s.id == id) else {
            return Err(AppError::VendaNaoEncontrada);
        };
        autorizar(&doc.sales[idx])?;
        doc.sales.remove(idx);
        self.write_doc(&doc).await
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut nome = path.as_os_str().to_os_string();
    nome.push(".tmp");
    PathBuf::from(nome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sales::{BaseComissao, ParcelaStatus};
    use tempfile::TempDir;

    // Custo mínimo do bcrypt, para o seed não dominar o tempo de teste.
    const CUSTO_BCRYPT_TESTE: u32 = 4;

    fn store_temporario() -> (SaleStore, TempDir) {
        let dir = TempDir::new().expect("tempdir");
        let store = SaleStore::new(dir.path().join("data.json"));
        (store, dir)
    }

    fn venda(id: &str, user_id: &str) -> Sale {
        Sale {
            id: id.into(),
            user_id: user_id.into(),
            consultor_name: "Pedro".into(),
            cliente: "Maria".into(),
            produto: "Consórcio Auto".into(),
            data: "2026-02-01".into(),
            seguro: "Não".into(),
            cotas: 10,
            valor_unit: 1000.0,
            valor_venda: 0.0,
            base_comissao: BaseComissao::Credito,
            taxa_pct: 5.0,
            credito_raw: 10_000.0,
            credito: 10_000.0,
            comissao_total: 500.0,
            parcelas: vec![ParcelaStatus::Pendente; 6],
            created_at: "2026-02-01T12:00:00Z".into(),
            updated_at: "2026-02-01T12:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn primeira_carga_cria_documento_vazio() {
        let (store, _dir) = store_temporario();
        let doc = store.load().await.expect("load");
        assert!(doc.users.is_empty());
        assert!(doc.sales.is_empty());
    }

    #[tokio::test]
    async fn arquivo_corrompido_falha_alto_sem_sobrescrever() {
        let (store, dir) = store_temporario();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ isso nao é json").expect("write");

        let err = store.load().await.expect_err("deveria falhar");
        assert!(matches!(err, AppError::DadosCorrompidos(_)));

        // O conteúdo original continua intocado para inspeção manual.
        let raw = std::fs::read_to_string(&path).expect("read");
        assert_eq!(raw, "{ isso nao é json");
    }

    #[tokio::test]
    async fn seed_e_idempotente() {
        let (store, _dir) = store_temporario();
        store
            .seed_users_if_needed(None, CUSTO_BCRYPT_TESTE)
            .await
            .expect("seed");
        let antes = store.load().await.expect("load").users;
        assert_eq!(antes.len(), 6);

        store
            .seed_users_if_needed(Some("outra senha".into()), CUSTO_BCRYPT_TESTE)
            .await
            .expect("seed 2");
        let depois = store.load().await.expect("load").users;
        assert_eq!(depois.len(), 6);
        // mesmo hash de admin: o segundo seed não tocou em nada
        assert_eq!(antes[0].password_hash, depois[0].password_hash);
    }

    #[tokio::test]
    async fn seed_persiste_o_hash_no_documento() {
        let (store, dir) = store_temporario();
        store
            .seed_users_if_needed(None, CUSTO_BCRYPT_TESTE)
            .await
            .expect("seed");

        // O hash tem que sobreviver à ida e volta pelo disco.
        let users = store.load().await.expect("load depois do seed").users;
        assert!(users.iter().all(|u| u.password_hash.starts_with("$2")));

        // E o JSON gravado carrega o campo de fato (um segundo processo
        // apontando para o mesmo arquivo consegue autenticar).
        let raw = std::fs::read_to_string(dir.path().join("data.json")).expect("read");
        assert!(raw.contains("passwordHash"));

        let outro_processo = SaleStore::new(dir.path().join("data.json"));
        let pedro = outro_processo
            .find_user_by_username("pedro")
            .await
            .expect("busca")
            .expect("existe");
        assert!(bcrypt::verify("1234", &pedro.password_hash).expect("verify"));
    }

    #[tokio::test]
    async fn busca_de_usuario_ignora_caixa() {
        let (store, _dir) = store_temporario();
        store
            .seed_users_if_needed(None, CUSTO_BCRYPT_TESTE)
            .await
            .expect("seed");
        let user = store
            .find_user_by_username("PeDrO")
            .await
            .expect("busca")
            .expect("existe");
        assert_eq!(user.id, "u_pedro");
    }

    #[tokio::test]
    async fn listagem_filtra_por_dono() {
        let (store, _dir) = store_temporario();
        store.create_sale(venda("v1", "u_pedro")).await.expect("v1");
        store
            .create_sale(venda("v2", "u_graziele"))
            .await
            .expect("v2");

        let de_pedro = store
            .list_sales_for(Role::Consultor, "u_pedro")
            .await
            .expect("lista");
        assert_eq!(de_pedro.len(), 1);
        assert_eq!(de_pedro[0].id, "v1");

        let todas = store
            .list_sales_for(Role::Admin, "u_admin")
            .await
            .expect("lista admin");
        assert_eq!(todas.len(), 2);
        // mais recente primeiro
        assert_eq!(todas[0].id, "v2");
    }

    #[tokio::test]
    async fn update_preserva_posicao_e_aplica_transform() {
        let (store, _dir) = store_temporario();
        store.create_sale(venda("v1", "u_pedro")).await.expect("v1");
        store.create_sale(venda("v2", "u_pedro")).await.expect("v2");

        let atualizada = store
            .update_sale("v1", |atual| {
                Ok(Sale {
                    cliente: "Cliente Novo".into(),
                    ..atual.clone()
                })
            })
            .await
            .expect("update");
        assert_eq!(atualizada.cliente, "Cliente Novo");

        let todas = store
            .list_sales_for(Role::Admin, "u_admin")
            .await
            .expect("lista");
        assert_eq!(todas[1].id, "v1");
        assert_eq!(todas[1].cliente, "Cliente Novo");
    }

    #[tokio::test]
    async fn update_e_delete_reportam_ausencia() {
        let (store, _dir) = store_temporario();
        let err = store
            .update_sale("nao-existe", |s| Ok(s.clone()))
            .await
            .expect_err("update ausente");
        assert!(matches!(err, AppError::VendaNaoEncontrada));

        let err = store
            .delete_sale("nao-existe", |_| Ok(()))
            .await
            .expect_err("delete ausente");
        assert!(matches!(err, AppError::VendaNaoEncontrada));
    }

    #[tokio::test]
    async fn transform_recusado_nao_grava_nada() {
        let (store, _dir) = store_temporario();
        store.create_sale(venda("v1", "u_pedro")).await.expect("v1");

        // A recusa acontece sob o mesmo lock da mutação; nada muda.
        let err = store
            .update_sale("v1", |_| Err(AppError::AcessoNegado))
            .await
            .expect_err("update recusado");
        assert!(matches!(err, AppError::AcessoNegado));

        let err = store
            .delete_sale("v1", |_| Err(AppError::AcessoNegado))
            .await
            .expect_err("delete recusado");
        assert!(matches!(err, AppError::AcessoNegado));

        let doc = store.load().await.expect("load");
        assert_eq!(doc.sales.len(), 1);
        assert_eq!(doc.sales[0].cliente, "Maria");
    }

    #[tokio::test]
    async fn delete_remove_e_nao_deixa_tmp() {
        let (store, dir) = store_temporario();
        store.create_sale(venda("v1", "u_pedro")).await.expect("v1");
        store.delete_sale("v1", |_| Ok(())).await.expect("delete");

        let doc = store.load().await.expect("load");
        assert!(doc.sales.is_empty());
        assert!(!dir.path().join("data.json.tmp").exists());
    }
}
