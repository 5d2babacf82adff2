//! # Módulo HTTP
//!
//! Protocolo HTTP/1.1 implementado desde cero, sin librerías de alto nivel:
//!
//! - Parser byte a byte de la request line y los headers
//! - Construcción de responses HTTP
//! - Códigos de estado
//!
//! ## Lo que NO hace
//!
//! - Keep-alive ni pipelining: un request por conexión
//! - Chunked transfer encoding ni `Content-Length` en el request
//! - Compresión
//! - Parsing de la query string (queda dentro del recurso)
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```

pub mod parser;    // Máquinas de estado de request line y headers
pub mod request;   // Request, Method y Version
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use parser::ParseResult;
pub use request::{Method, Request, Version};
pub use response::Response;
pub use status::StatusCode;
