//! # Garbage Panda
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado desde cero: parser byte a byte
//! con máquinas de estado, un thread por conexión y archivos estáticos
//! confinados a un directorio.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parser, Request, Response y códigos de estado
//! - `router`: Rutas exactas, bodies de error y archivos estáticos
//! - `server`: Accept loop, workers y shutdown
//! - `commands`: Handlers de ejemplo (`/`, `/hello`, `/status`)
//! - `config`: Argumentos CLI y variables de entorno
//! - `error`: Errores de arranque
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use garbage_panda::config::Config;
//! use garbage_panda::router::RouterBuilder;
//! use garbage_panda::server::Server;
//!
//! let config = Config::default();
//! let mut builder = RouterBuilder::new();
//! garbage_panda::commands::register_defaults(&mut builder, &config)?;
//!
//! let server = Server::bind(&config, builder.build())?;
//! server.run();
//! # Ok::<(), garbage_panda::error::ServerError>(())
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod router;
pub mod server;
