//! PostgreSQL-backed `PortalStore` implementation.

use crate::db::traits::{
    CompanyRepository, ConnectorRepository, DocumentRepository, OnboardingRepository,
    ProcessRepository, ServiceAccountRepository, StaticDataRepository,
};
use crate::error::{Error, Result};
use crate::models::{
    Bpn, Company, CompanyStatus, Connector, ConnectorStatus, Document, DocumentStatus,
    DocumentType, Language, LicenseType, LocalizedName, OnboardingProviderDetail, OperatorBpn,
    Page, Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType, ServiceAccount,
    ServiceAccountKind, ServiceAccountStatus, UseCase,
};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresPortalStore {
    pool: PgPool,
}

impl PostgresPortalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn bad_value(column: &str, value: &str) -> Error {
    Error::Internal(format!("unexpected {column} value '{value}' in database"))
}

fn map_company(row: &PgRow) -> Result<Company> {
    let status: String = row.get("status");
    let bpn: Option<String> = row.get("bpn");
    Ok(Company {
        id: row.get("id"),
        name: row.get("name"),
        bpn: bpn
            .map(|b| Bpn::from_str(&b).map_err(|_| bad_value("bpn", &b)))
            .transpose()?,
        status: CompanyStatus::parse(&status).ok_or_else(|| bad_value("status", &status))?,
        onboarding_provider_id: row.get("onboarding_provider_id"),
        registration_process_id: row.get("registration_process_id"),
        sd_document_id: row.get("sd_document_id"),
    })
}

fn map_connector(row: &PgRow) -> Result<Connector> {
    let status: String = row.get("status");
    Ok(Connector {
        id: row.get("id"),
        name: row.get("name"),
        url: row.get("url"),
        company_id: row.get("company_id"),
        status: ConnectorStatus::parse(&status).ok_or_else(|| bad_value("status", &status))?,
        daps_client_id: row.get("daps_client_id"),
        sd_document_id: row.get("sd_document_id"),
        process_id: row.get("process_id"),
    })
}

fn map_service_account(row: &PgRow) -> Result<ServiceAccount> {
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    Ok(ServiceAccount {
        id: row.get("id"),
        client_id: row.get("client_id"),
        name: row.get("name"),
        company_id: row.get("company_id"),
        kind: ServiceAccountKind::parse(&kind).ok_or_else(|| bad_value("kind", &kind))?,
        status: ServiceAccountStatus::parse(&status)
            .ok_or_else(|| bad_value("status", &status))?,
        deletion_process_id: row.get("deletion_process_id"),
    })
}

fn map_document(row: &PgRow) -> Result<Document> {
    let doc_type: String = row.get("doc_type");
    let status: String = row.get("status");
    Ok(Document {
        id: row.get("id"),
        name: row.get("name"),
        content: row.get("content"),
        media_type: row.get("media_type"),
        doc_type: DocumentType::parse(&doc_type).ok_or_else(|| bad_value("doc_type", &doc_type))?,
        status: DocumentStatus::parse(&status).ok_or_else(|| bad_value("status", &status))?,
        company_id: row.get("company_id"),
        created_at: row.get("created_at"),
    })
}

fn map_process(row: &PgRow) -> Result<Process> {
    let process_type: String = row.get("process_type");
    Ok(Process {
        id: row.get("id"),
        process_type: ProcessType::parse(&process_type)
            .ok_or_else(|| bad_value("process_type", &process_type))?,
        version: row.get("version"),
    })
}

fn map_step(row: &PgRow) -> Result<ProcessStep> {
    let step_type: String = row.get("step_type");
    let status: String = row.get("status");
    Ok(ProcessStep {
        id: row.get("id"),
        process_id: row.get("process_id"),
        step_type: ProcessStepType::parse(&step_type)
            .ok_or_else(|| bad_value("step_type", &step_type))?,
        status: ProcessStepStatus::parse(&status).ok_or_else(|| bad_value("status", &status))?,
        message: row.get("message"),
        claimed_by: row.get("claimed_by"),
        created_at: row.get("created_at"),
    })
}

const COMPANY_COLUMNS: &str =
    "id, name, bpn, status, onboarding_provider_id, registration_process_id, sd_document_id";
const STEP_COLUMNS: &str = "id, process_id, step_type, status, message, claimed_by, created_at";

/// A process never holds two `Todo` steps of the same type.
async fn assert_no_pending_step(
    conn: &mut sqlx::PgConnection,
    process_id: Uuid,
    step_type: ProcessStepType,
) -> Result<()> {
    let pending: bool = sqlx::query_scalar(
        "SELECT EXISTS(
             SELECT 1 FROM process_steps
             WHERE process_id = $1 AND step_type = $2 AND status = 'TODO'
         )",
    )
    .bind(process_id)
    .bind(step_type.as_str())
    .fetch_one(&mut *conn)
    .await?;
    if pending {
        return Err(Error::Conflict(format!(
            "process {process_id} already has a pending {step_type} step"
        )));
    }
    Ok(())
}

#[async_trait]
impl CompanyRepository for PostgresPortalStore {
    async fn get_company(&self, id: Uuid) -> Result<Option<Company>> {
        let row = sqlx::query(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_company).transpose()
    }

    async fn get_company_for_process(&self, process_id: Uuid) -> Result<Option<Company>> {
        let row = sqlx::query(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE registration_process_id = $1"
        ))
        .bind(process_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_company).transpose()
    }

    async fn get_active_member_companies(
        &self,
        bpns: &[Bpn],
        page: u32,
        page_size: u32,
    ) -> Result<Page<Company>> {
        let filter: Option<Vec<String>> = if bpns.is_empty() {
            None
        } else {
            Some(bpns.iter().map(|b| b.as_str().to_string()).collect())
        };

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM companies
             WHERE status = 'ACTIVE' AND bpn IS NOT NULL
               AND ($1::TEXT[] IS NULL OR bpn = ANY($1))",
        )
        .bind(&filter)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies
             WHERE status = 'ACTIVE' AND bpn IS NOT NULL
               AND ($1::TEXT[] IS NULL OR bpn = ANY($1))
             ORDER BY name ASC, id ASC
             LIMIT $2 OFFSET $3"
        ))
        .bind(&filter)
        .bind(i64::from(page_size))
        .bind(i64::from(page) * i64::from(page_size))
        .fetch_all(&self.pool)
        .await?;

        let content = rows.iter().map(map_company).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(total as u64, page, page_size, content))
    }

    async fn attach_sd_document(&self, company_id: Uuid, document_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE companies SET sd_document_id = $2 WHERE id = $1")
            .bind(company_id)
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ConnectorRepository for PostgresPortalStore {
    async fn get_connector(&self, id: Uuid) -> Result<Option<Connector>> {
        let row = sqlx::query(
            "SELECT id, name, url, company_id, status, daps_client_id, sd_document_id, process_id
             FROM connectors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_connector).transpose()
    }

    async fn get_connector_for_process(&self, process_id: Uuid) -> Result<Option<Connector>> {
        let row = sqlx::query(
            "SELECT id, name, url, company_id, status, daps_client_id, sd_document_id, process_id
             FROM connectors WHERE process_id = $1",
        )
        .bind(process_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_connector).transpose()
    }

    async fn update_connector_registration(
        &self,
        connector_id: Uuid,
        daps_client_id: Option<String>,
        sd_document_id: Option<Uuid>,
        status: ConnectorStatus,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE connectors
             SET daps_client_id = COALESCE($2, daps_client_id),
                 sd_document_id = COALESCE($3, sd_document_id),
                 status = $4
             WHERE id = $1",
        )
        .bind(connector_id)
        .bind(daps_client_id)
        .bind(sd_document_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceAccountRepository for PostgresPortalStore {
    async fn get_service_account(&self, id: Uuid) -> Result<Option<ServiceAccount>> {
        let row = sqlx::query(
            "SELECT id, client_id, name, company_id, kind, status, deletion_process_id
             FROM service_accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_service_account).transpose()
    }

    async fn get_service_account_for_process(
        &self,
        process_id: Uuid,
    ) -> Result<Option<ServiceAccount>> {
        let row = sqlx::query(
            "SELECT id, client_id, name, company_id, kind, status, deletion_process_id
             FROM service_accounts WHERE deletion_process_id = $1",
        )
        .bind(process_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_service_account).transpose()
    }

    async fn update_service_account_status(
        &self,
        id: Uuid,
        status: ServiceAccountStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE service_accounts SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_pending_deletion(&self, id: Uuid, process_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE service_accounts
             SET status = 'PENDING_DELETION', deletion_process_id = $2
             WHERE id = $1",
        )
        .bind(id)
        .bind(process_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for PostgresPortalStore {
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, name, content, media_type, doc_type, status, company_id, created_at
             FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_document).transpose()
    }

    async fn get_frame_documents(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, name, content, media_type, doc_type, status, company_id, created_at
             FROM documents
             WHERE doc_type = 'FRAME_CONTRACT' AND status <> 'INACTIVE'
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_document).collect()
    }

    async fn insert_document(&self, document: &Document) -> Result<()> {
        sqlx::query(
            "INSERT INTO documents (id, name, content, media_type, doc_type, status, company_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(document.id)
        .bind(&document.name)
        .bind(&document.content)
        .bind(&document.media_type)
        .bind(document.doc_type.as_str())
        .bind(document.status.as_str())
        .bind(document.company_id)
        .bind(document.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OnboardingRepository for PostgresPortalStore {
    async fn is_onboarding_service_provider(&self, company_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM company_roles
                 WHERE company_id = $1 AND role = 'ONBOARDING_SERVICE_PROVIDER'
             )",
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn get_provider_detail(
        &self,
        company_id: Uuid,
    ) -> Result<Option<OnboardingProviderDetail>> {
        let row = sqlx::query(
            "SELECT company_id, callback_url, auth_url, client_id, client_secret,
                    initialization_vector, encryption_mode
             FROM onboarding_provider_details WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| {
            let encryption_mode: i32 = r.get("encryption_mode");
            OnboardingProviderDetail {
                company_id: r.get("company_id"),
                callback_url: r.get("callback_url"),
                auth_url: r.get("auth_url"),
                client_id: r.get("client_id"),
                client_secret: r.get("client_secret"),
                initialization_vector: r.get("initialization_vector"),
                encryption_mode: encryption_mode as u32,
            }
        }))
    }

    async fn upsert_provider_detail(&self, detail: &OnboardingProviderDetail) -> Result<()> {
        sqlx::query(
            "INSERT INTO onboarding_provider_details
                 (company_id, callback_url, auth_url, client_id, client_secret,
                  initialization_vector, encryption_mode)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (company_id) DO UPDATE SET
                 callback_url = EXCLUDED.callback_url,
                 auth_url = EXCLUDED.auth_url,
                 client_id = EXCLUDED.client_id,
                 client_secret = EXCLUDED.client_secret,
                 initialization_vector = EXCLUDED.initialization_vector,
                 encryption_mode = EXCLUDED.encryption_mode",
        )
        .bind(detail.company_id)
        .bind(&detail.callback_url)
        .bind(&detail.auth_url)
        .bind(&detail.client_id)
        .bind(&detail.client_secret)
        .bind(&detail.initialization_vector)
        .bind(detail.encryption_mode as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProcessRepository for PostgresPortalStore {
    async fn get_process(&self, id: Uuid) -> Result<Option<Process>> {
        let row = sqlx::query("SELECT id, process_type, version FROM processes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_process).transpose()
    }

    async fn get_steps(&self, process_id: Uuid) -> Result<Vec<ProcessStep>> {
        let rows = sqlx::query(&format!(
            "SELECT {STEP_COLUMNS} FROM process_steps
             WHERE process_id = $1 ORDER BY created_at ASC"
        ))
        .bind(process_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_step).collect()
    }

    async fn create_process(&self, process: &Process, steps: &[ProcessStep]) -> Result<()> {
        for (idx, step) in steps.iter().enumerate() {
            let duplicate = step.status == ProcessStepStatus::Todo
                && steps[..idx].iter().any(|s| {
                    s.step_type == step.step_type && s.status == ProcessStepStatus::Todo
                });
            if duplicate {
                return Err(Error::Conflict(format!(
                    "process {} already has a pending {} step",
                    step.process_id, step.step_type
                )));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO processes (id, process_type, version) VALUES ($1, $2, $3)")
            .bind(process.id)
            .bind(process.process_type.as_str())
            .bind(process.version)
            .execute(&mut *tx)
            .await?;
        for step in steps {
            sqlx::query(
                "INSERT INTO process_steps (id, process_id, step_type, status, message, claimed_by, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(step.id)
            .bind(step.process_id)
            .bind(step.step_type.as_str())
            .bind(step.status.as_str())
            .bind(&step.message)
            .bind(&step.claimed_by)
            .bind(step.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_step(&self, step: &ProcessStep) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if step.status == ProcessStepStatus::Todo {
            assert_no_pending_step(&mut *tx, step.process_id, step.step_type).await?;
        }
        sqlx::query(
            "INSERT INTO process_steps (id, process_id, step_type, status, message, claimed_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(step.id)
        .bind(step.process_id)
        .bind(step.step_type.as_str())
        .bind(step.status.as_str())
        .bind(&step.message)
        .bind(&step.claimed_by)
        .bind(step.created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn save_transition(&self, completed: &ProcessStep, next: &ProcessStep) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE process_steps SET status = $2, message = $3 WHERE id = $1")
            .bind(completed.id)
            .bind(completed.status.as_str())
            .bind(&completed.message)
            .execute(&mut *tx)
            .await?;
        if next.status == ProcessStepStatus::Todo {
            assert_no_pending_step(&mut *tx, next.process_id, next.step_type).await?;
        }
        sqlx::query(
            "INSERT INTO process_steps (id, process_id, step_type, status, message, claimed_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(next.id)
        .bind(next.process_id)
        .bind(next.step_type.as_str())
        .bind(next.status.as_str())
        .bind(&next.message)
        .bind(&next.claimed_by)
        .bind(next.created_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE processes SET version = $2 WHERE id = $1")
            .bind(completed.process_id)
            .bind(Uuid::new_v4())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn claim_next_step(
        &self,
        step_types: &[ProcessStepType],
        worker_id: &str,
    ) -> Result<Option<ProcessStep>> {
        let types: Vec<String> = step_types.iter().map(|t| t.as_str().to_string()).collect();
        let row = sqlx::query(&format!(
            "UPDATE process_steps
             SET claimed_by = $1
             WHERE id = (
                 SELECT id FROM process_steps
                 WHERE status = 'TODO'
                   AND claimed_by IS NULL
                   AND step_type = ANY($2)
                 ORDER BY created_at ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {STEP_COLUMNS}"
        ))
        .bind(worker_id)
        .bind(&types)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_step).transpose()
    }

    async fn finish_step(
        &self,
        step_id: Uuid,
        status: ProcessStepStatus,
        message: Option<String>,
    ) -> Result<()> {
        sqlx::query("UPDATE process_steps SET status = $2, message = $3 WHERE id = $1")
            .bind(step_id)
            .bind(status.as_str())
            .bind(message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StaticDataRepository for PostgresPortalStore {
    async fn get_use_cases(&self) -> Result<Vec<UseCase>> {
        let rows = sqlx::query("SELECT id, name, shortname FROM use_cases ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| UseCase {
                id: r.get("id"),
                name: r.get("name"),
                shortname: r.get("shortname"),
            })
            .collect())
    }

    async fn get_license_types(&self) -> Result<Vec<LicenseType>> {
        let rows = sqlx::query("SELECT id, name FROM license_types ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| LicenseType {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn get_languages(&self) -> Result<Vec<Language>> {
        let rows = sqlx::query(
            "SELECT l.short_name, n.language, n.long_name
             FROM languages l
             JOIN language_long_names n ON n.short_name = l.short_name
             ORDER BY l.short_name ASC, n.language ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut languages: Vec<Language> = Vec::new();
        for row in rows {
            let short_name: String = row.get("short_name");
            let localized = LocalizedName {
                language: row.get("language"),
                long_name: row.get("long_name"),
            };
            match languages.last_mut() {
                Some(last) if last.short_name == short_name => last.long_names.push(localized),
                _ => languages.push(Language {
                    short_name,
                    long_names: vec![localized],
                }),
            }
        }
        Ok(languages)
    }

    async fn get_operator_bpns(&self) -> Result<Vec<OperatorBpn>> {
        let rows =
            sqlx::query("SELECT operator_name, bpn FROM operator_bpns ORDER BY operator_name ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter()
            .map(|r| {
                let bpn: String = r.get("bpn");
                Ok(OperatorBpn {
                    operator_name: r.get("operator_name"),
                    bpn: Bpn::from_str(&bpn).map_err(|_| bad_value("bpn", &bpn))?,
                })
            })
            .collect()
    }
}
