//! Implementación Postgres (Diesel) del `RecordStore` del core.
//!
//! - `upsert_responses`: inserta el lote completo en una sola transacción con
//!   `ON CONFLICT (user_id, question_key) DO UPDATE`, de modo que repetir un
//!   lote sobrescribe en lugar de duplicar filas. En la misma transacción crea
//!   el perfil del usuario si aún no existe.
//! - `mark_onboarding_completed`: `UPDATE user_profiles SET
//!   onboarding_completed = true`; si el perfil no existe se reporta como
//!   escritura rechazada.
//! - Diesel es bloqueante: cada operación corre en `spawn_blocking`, con
//!   reintento y backoff para errores transitorios.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::upsert::excluded;
use log::{debug, error, warn};
use serde_json::Value;
use uuid::Uuid;

use onboarding_core::constants::{PROFILES_TABLE, RESPONSES_TABLE};
use onboarding_core::{AnswerValue, RecordStore, ResponseRecord, StoreError, UserId};

use crate::config::DbConfig;
use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{questionnaire_responses, user_profiles};

/// Pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real o un doble en tests sin acoplar el store a
/// r2d2. Debe devolver una conexión válida o `PersistenceError::TransientIo`.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError>;
}

/// `ConnectionProvider` respaldado por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila para insertar en `questionnaire_responses` (`id` y `created_at` los
/// asigna la base).
#[derive(Insertable, Debug)]
#[diesel(table_name = questionnaire_responses)]
pub struct NewResponseRow {
    pub user_id: Uuid,
    pub step_number: i32,
    pub question_key: String,
    pub response_value: Value,
}

impl TryFrom<&ResponseRecord> for NewResponseRow {
    type Error = PersistenceError;

    fn try_from(record: &ResponseRecord) -> Result<Self, Self::Error> {
        let step_number = i32::try_from(record.step_number)
            .map_err(|_| PersistenceError::CheckViolation(format!("step_number {} out of range", record.step_number)))?;
        Ok(Self { user_id: record.user_id.as_uuid(),
                  step_number,
                  question_key: record.question_key.clone(),
                  response_value: record.response_value.to_json() })
    }
}

/// Fila leída de `questionnaire_responses`.
#[derive(Queryable, Debug)]
pub struct ResponseRow {
    pub user_id: Uuid,
    pub step_number: i32,
    pub question_key: String,
    pub response_value: Value,
}

impl TryFrom<ResponseRow> for ResponseRecord {
    type Error = PersistenceError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        let response_value: AnswerValue = serde_json::from_value(row.response_value)
            .map_err(|e| PersistenceError::Unknown(format!("response_value for '{}': {e}", row.question_key)))?;
        let step_number = u32::try_from(row.step_number)
            .map_err(|_| PersistenceError::Unknown(format!("step_number {} for '{}'", row.step_number, row.question_key)))?;
        Ok(ResponseRecord { user_id: UserId::new(row.user_id),
                            step_number,
                            question_key: row.question_key,
                            response_value })
    }
}

/// Reintento con backoff lineal corto (hasta 3 reintentos: 15ms, 30ms, 45ms).
///
/// Sólo repite la unidad de trabajo `f`; emite `warn!` por intento.
pub(crate) fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if e.is_transient() && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {e} -> sleeping {delay_ms}ms", attempts + 1);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Store Postgres de respuestas y marca de onboarding.
pub struct PgRecordStore<P: ConnectionProvider> {
    provider: Arc<P>,
}

impl<P: ConnectionProvider> PgRecordStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider: Arc::new(provider) }
    }

    /// Crea el perfil si no existe (normalmente lo hace el alta del
    /// usuario).
    pub fn ensure_profile(&self, user_id: UserId) -> Result<(), PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(user_profiles::table).values(user_profiles::id.eq(user_id.as_uuid()))
                                                     .on_conflict_do_nothing()
                                                     .execute(&mut conn)?;
            Ok(())
        })
    }

    /// Respuestas persistidas de un usuario, ordenadas por (paso, key).
    pub fn responses_for(&self, user_id: UserId) -> Result<Vec<ResponseRecord>, PersistenceError> {
        let rows: Vec<ResponseRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            questionnaire_responses::table.filter(questionnaire_responses::user_id.eq(user_id.as_uuid()))
                                          .order((questionnaire_responses::step_number.asc(),
                                                  questionnaire_responses::question_key.asc()))
                                          .select((questionnaire_responses::user_id,
                                                   questionnaire_responses::step_number,
                                                   questionnaire_responses::question_key,
                                                   questionnaire_responses::response_value))
                                          .load(&mut conn)
                                          .map_err(PersistenceError::from)
        })?;
        rows.into_iter().map(ResponseRecord::try_from).collect()
    }

    /// Estado de la marca; un perfil inexistente cuenta como no completado.
    pub fn is_onboarding_completed(&self, user_id: UserId) -> Result<bool, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            let flag = user_profiles::table.find(user_id.as_uuid())
                                           .select(user_profiles::onboarding_completed)
                                           .first::<bool>(&mut conn)
                                           .optional()?;
            Ok(flag.unwrap_or(false))
        })
    }

    /// Ejecuta `f` en el pool de tareas bloqueantes de tokio.
    async fn run_blocking<T, F>(&self, op: &'static str, f: F) -> Result<T, StoreError>
        where T: Send + 'static,
              F: FnOnce(&P) -> Result<T, PersistenceError> + Send + 'static
    {
        let provider = Arc::clone(&self.provider);
        match tokio::task::spawn_blocking(move || f(&provider)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("{op} failed: {e}");
                Err(StoreError::from(e))
            }
            Err(join) => Err(StoreError::Unavailable(format!("{op} task aborted: {join}"))),
        }
    }
}

/// Perfiles referenciados por el lote, sin repetir.
fn profile_ids(rows: &[NewResponseRow]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
    ids.sort();
    ids.dedup();
    ids
}

fn upsert_rows<P: ConnectionProvider>(provider: &P, rows: &[NewResponseRow]) -> Result<usize, PersistenceError> {
    let profiles = profile_ids(rows);
    with_retry(|| {
        let mut conn = provider.connection()?;
        conn.build_transaction()
            .read_write()
            .run(|tx| {
                // el usuario puede haber iniciado sesión sin perfil previo
                for id in &profiles {
                    diesel::insert_into(user_profiles::table).values(user_profiles::id.eq(*id))
                                                             .on_conflict_do_nothing()
                                                             .execute(tx)?;
                }
                diesel::insert_into(questionnaire_responses::table)
                    .values(rows)
                    .on_conflict((questionnaire_responses::user_id, questionnaire_responses::question_key))
                    .do_update()
                    .set((questionnaire_responses::step_number.eq(excluded(questionnaire_responses::step_number)),
                          questionnaire_responses::response_value.eq(excluded(questionnaire_responses::response_value))))
                    .execute(tx)
            })
            .map_err(PersistenceError::from)
    })
}

fn mark_completed<P: ConnectionProvider>(provider: &P, user_id: Uuid) -> Result<(), PersistenceError> {
    let updated = with_retry(|| {
        let mut conn = provider.connection()?;
        diesel::update(user_profiles::table.find(user_id))
            .set((user_profiles::onboarding_completed.eq(true), user_profiles::updated_at.eq(Utc::now())))
            .execute(&mut conn)
            .map_err(PersistenceError::from)
    })?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("{PROFILES_TABLE} id={user_id}")));
    }
    Ok(())
}

#[async_trait]
impl<P: ConnectionProvider> RecordStore for PgRecordStore<P> {
    async fn upsert_responses(&self, records: &[ResponseRecord]) -> Result<(), StoreError> {
        let rows = records.iter().map(NewResponseRow::try_from).collect::<Result<Vec<_>, _>>()?;
        debug!("upsert_responses:start table={RESPONSES_TABLE} rows={}", rows.len());
        let written = self.run_blocking("upsert_responses", move |provider| upsert_rows(provider, &rows)).await?;
        debug!("upsert_responses:done rows={written}");
        Ok(())
    }

    async fn mark_onboarding_completed(&self, user_id: UserId) -> Result<(), StoreError> {
        debug!("mark_onboarding_completed:start user_id={user_id}");
        let id = user_id.as_uuid();
        self.run_blocking("mark_onboarding_completed", move |provider| mark_completed(provider, id)).await
    }
}

/// Construye el pool (min_idle / max_size) y corre las migraciones
/// pendientes una vez.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let max = max_size.max(1);
    let min = min_size.max(1);
    if min > max {
        warn!("min_size > max_size ({min} > {max}), ajustando min=max");
    }
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(min.min(max)))
                                    .max_size(max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

pub fn build_pool_from_config(cfg: &DbConfig) -> Result<PgPool, PersistenceError> {
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

/// Helper de desarrollo: carga `.env`, lee `DbConfig` y construye un pool ya
/// migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    let cfg = DbConfig::from_env()?;
    build_pool_from_config(&cfg)
}
