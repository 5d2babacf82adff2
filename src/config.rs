//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./garbage_panda --port 8080 --localhost \
//!   --static-dir ./public \
//!   --max-connections 64
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 STATIC_DIR=./public LOG_LEVEL=debug ./garbage_panda
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, Level};

use crate::error::{Result, ServerError};

/// Configuración del servidor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "garbage_panda")]
#[command(about = "Servidor HTTP/1.1 con un thread por conexión")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "1234", env = "HTTP_PORT")]
    pub port: u16,

    /// Escuchar solo en 127.0.0.1 (por defecto 0.0.0.0)
    #[arg(long, env = "HTTP_LOCALHOST")]
    pub localhost: bool,

    // === Archivos estáticos ===
    /// Prefijo de los recursos servidos desde disco
    #[arg(long = "static-prefix", default_value = "/static", env = "STATIC_PREFIX")]
    pub static_prefix: String,

    /// Directorio raíz de los archivos estáticos
    #[arg(long = "static-dir", default_value = "./static", env = "STATIC_DIR")]
    pub static_dir: PathBuf,

    /// Archivo que se sirve en `/` (relativo al directorio de trabajo)
    #[arg(long = "index-file", default_value = "index.html", env = "INDEX_FILE")]
    pub index_file: PathBuf,

    // === Conexiones ===
    /// Timeout de cada lectura del socket en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "100", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Máximo de conexiones atendidas a la vez (0 = sin límite)
    #[arg(long = "max-connections", default_value = "0", env = "MAX_CONNECTIONS")]
    pub max_connections: usize,

    // === Logging ===
    /// Nivel de log (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: Level,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Host de bind según `--localhost`
    pub fn host(&self) -> &'static str {
        if self.localhost {
            "127.0.0.1"
        } else {
            "0.0.0.0"
        }
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use garbage_panda::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:1234");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host(), self.port)
    }

    /// Timeout de lectura como `Duration`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<()> {
        if self.read_timeout_ms == 0 {
            return Err(ServerError::Config("read timeout must be > 0".to_string()));
        }

        if !self.static_prefix.starts_with('/') {
            return Err(ServerError::Config(format!(
                "static prefix must start with '/': {:?}",
                self.static_prefix
            )));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        info!("Address:         {}", self.address());
        info!("Static:          {} -> {}", self.static_prefix, self.static_dir.display());
        info!("Index:           {}", self.index_file.display());
        info!("Read timeout:    {} ms", self.read_timeout_ms);

        if self.max_connections > 0 {
            info!("Max connections: {}", self.max_connections);
        } else {
            info!("Max connections: unlimited");
        }
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 1234,
            localhost: false,
            static_prefix: "/static".to_string(),
            static_dir: PathBuf::from("./static"),
            index_file: PathBuf::from("index.html"),
            read_timeout_ms: 100,
            max_connections: 0,
            log_level: Level::INFO,
        }
    }
}
