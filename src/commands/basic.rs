//! # Comandos Básicos
//! src/commands/basic.rs
//!
//! Handlers de ejemplo que levanta el binario:
//! - /: Contenido del archivo índice
//! - /hello: Responde `bruh`
//! - /status: Estado del servidor en JSON
//!
//! Y el body de los 404.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::http::{Request, Response, StatusCode};

/// Body de los 404
pub fn not_found_body() -> Vec<u8> {
    b"<h1>Not<br>Found</h1>".to_vec()
}

/// Handler para /
///
/// Lee `path` en cada request, así que cambios en el archivo se ven sin
/// reiniciar. Si no se puede leer responde 404 con [`not_found_body`].
pub fn index_handler(path: PathBuf) -> impl Fn(&Request) -> Response + Send + Sync + 'static {
    move |_req: &Request| match fs::read(&path) {
        Ok(content) => Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/html")
            .with_body_bytes(content),
        Err(e) => {
            warn!("No se pudo leer {}: {}", path.display(), e);
            Response::new(StatusCode::NotFound).with_body_bytes(not_found_body())
        }
    }
}

/// Handler para /hello
pub fn hello_handler(_req: &Request) -> Response {
    Response::new(StatusCode::Ok).with_body("bruh")
}

/// Respuesta de /status
#[derive(Debug, Serialize)]
struct ServerStatus {
    status: &'static str,
    server: &'static str,
    version: &'static str,
    method: String,
    http_version: String,
}

/// Handler para /status
///
/// # Ejemplo de response
/// ```json
/// {
///   "status": "running",
///   "server": "garbage_panda",
///   "version": "0.1.0",
///   "method": "GET",
///   "http_version": "HTTP/1.1"
/// }
/// ```
pub fn status_handler(req: &Request) -> Response {
    let status = ServerStatus {
        status: "running",
        server: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        method: req.method().to_string(),
        http_version: req.version().to_string(),
    };

    match serde_json::to_string(&status) {
        Ok(body) => Response::json(&body),
        Err(e) => {
            warn!("No se pudo serializar el estado: {}", e);
            Response::new(StatusCode::InternalServerError)
        }
    }
}
