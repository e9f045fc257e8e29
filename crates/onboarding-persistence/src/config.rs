//! Configuración de conexión desde variables de entorno (`DATABASE_URL` y
//! tamaños opcionales del pool).

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::error::PersistenceError;

// .env se carga una sola vez; si no existe se ignora.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(),
               min_connections: DEFAULT_MIN_CONNECTIONS,
               max_connections: DEFAULT_MAX_CONNECTIONS }
    }

    /// Lee `DATABASE_URL`, `DATABASE_MIN_CONNECTIONS` y
    /// `DATABASE_MAX_CONNECTIONS`. Valores de pool no numéricos se ignoran.
    pub fn from_env() -> Result<Self, PersistenceError> {
        init_dotenv();
        let url = env::var("DATABASE_URL").map_err(|_| PersistenceError::Config("DATABASE_URL no definido".into()))?;
        Ok(Self::new(url).pool_sizes_from_env())
    }

    /// Sobrescribe los tamaños del pool con `DATABASE_MIN_CONNECTIONS` /
    /// `DATABASE_MAX_CONNECTIONS` si están definidos.
    pub fn pool_sizes_from_env(mut self) -> Self {
        init_dotenv();
        if let Some(min) = env_u32("DATABASE_MIN_CONNECTIONS") {
            self.min_connections = min;
        }
        if let Some(max) = env_u32("DATABASE_MAX_CONNECTIONS") {
            self.max_connections = max;
        }
        self
    }
}

fn env_u32(name: &str) -> Option<u32> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Fuerza la carga temprana de `.env`.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
