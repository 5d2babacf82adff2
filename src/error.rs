//! # Errores de arranque
//! src/error.rs
//!
//! Errores que impiden levantar el servidor. Los errores de una conexión
//! individual no llegan aquí: se registran con `tracing` y solo terminan
//! ese worker.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::StatusCode;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuración inválida: {0}")]
    Config(String),

    #[error("No se pudo hacer bind a {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("No se pudo escuchar en {address}: {source}")]
    Listen {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Directorio estático inválido {path:?}: {source}")]
    StaticRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Solo se registran handlers de error para 4xx/5xx, no para {0}")]
    InvalidErrorStatus(StatusCode),

    #[error("No se pudo instalar el handler de Ctrl+C: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
