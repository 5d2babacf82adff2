//! # Comandos del Servidor
//!
//! Handlers de ejemplo y la función que los registra en un
//! [`RouterBuilder`] según la configuración.

pub mod basic;

pub use basic::*;

use crate::config::Config;
use crate::error::Result;
use crate::http::StatusCode;
use crate::router::RouterBuilder;

/// Registra `/`, `/hello`, `/status`, el body de 404 y el montaje estático
pub fn register_defaults(builder: &mut RouterBuilder, config: &Config) -> Result<()> {
    builder.register("/", index_handler(config.index_file.clone()));
    builder.register("/hello", hello_handler);
    builder.register("/status", status_handler);
    builder.register_error(StatusCode::NotFound, not_found_body)?;
    builder.set_static_root(&config.static_prefix, &config.static_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{ParseResult, Request};

    #[test]
    fn test_register_defaults_without_static_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            static_dir: tmp.path().join("static"),
            index_file: tmp.path().join("index.html"),
            ..Config::default()
        };

        let mut builder = RouterBuilder::new();
        register_defaults(&mut builder, &config).unwrap();
        let router = builder.build();

        let request = Request::parse(b"GET /static/x HTTP/1.1\r\n\r\n").unwrap();
        let response = router.dispatch(ParseResult::Ok, &request).unwrap();
        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body(), b"<h1>Not<br>Found</h1>");

        let hello = Request::parse(b"GET /hello HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(router.route(&hello).body(), b"bruh");
    }

    #[test]
    fn test_register_defaults_rejects_file_as_static_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("static");
        std::fs::write(&file, b"x").unwrap();

        let config = Config {
            static_dir: file,
            ..Config::default()
        };

        let mut builder = RouterBuilder::new();
        assert!(register_defaults(&mut builder, &config).is_err());
    }
}
