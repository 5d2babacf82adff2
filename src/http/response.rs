//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas y convertirlas a bytes para enviar al
//! cliente.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```
//!
//! Los headers se escriben en el orden en que se agregaron y no se agrega
//! ninguno automáticamente (ni siquiera `Content-Length`): la conexión se
//! cierra después de cada respuesta y eso marca el fin del body.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use garbage_panda::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("bruh");
//!
//! let bytes = response.to_bytes();
//! assert_eq!(bytes, b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nbruh");
//! ```

use indexmap::IndexMap;

use super::{StatusCode, Version};

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Versión de la status line (por defecto 1.1)
    version: Version,

    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción; repetir un nombre reemplaza el valor
    headers: IndexMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: Version::default(),
            status,
            headers: IndexMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe y conserva su posición.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo de la respuesta desde un string
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil para archivos estáticos y bodies de error.
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Cambia la versión de la status line
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Crea una respuesta JSON exitosa (200 OK)
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Status line y headers, terminados en la línea vacía
    ///
    /// Los headers se codifican como ISO-8859-1; un char fuera de ese
    /// rango se escribe como `?`.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut head = format!("{} {}\r\n", self.version, self.status);

        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }

        head.push_str("\r\n");

        head.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// Genera:
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body: contenido binario
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = self.header_bytes();
        result.extend_from_slice(&self.body);
        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene la versión de la status line
    pub fn version(&self) -> Version {
        self.version
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
