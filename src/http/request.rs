//! # Requests HTTP/1.1
//! src/http/request.rs
//!
//! Tipos que produce el parser (ver [`parser`](super::parser)).
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /static/index.html HTTP/1.1\r\n
//! Host: localhost:1234\r\n
//! User-Agent: curl/8.5.0\r\n
//! \r\n
//! <body sin framing>
//! ```
//!
//! El recurso se guarda tal cual llega: no se decodifica `%XX` ni se separa
//! la query string. `/hello?x=1` y `/hello` son recursos distintos.

use std::collections::HashMap;

use super::parser::{self, ParseResult};

/// Métodos HTTP reconocidos por el parser
///
/// Cualquier otro token en la request line es un request malformado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    CONNECT,
    DELETE,
    GET,
    HEAD,
    OPTIONS,
    PATCH,
    POST,
    PUT,
    TRACE,
}

impl Method {
    /// Todos los métodos, en orden alfabético
    pub const ALL: [Method; 9] = [
        Method::CONNECT,
        Method::DELETE,
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::PATCH,
        Method::POST,
        Method::PUT,
        Method::TRACE,
    ];

    /// Busca el método cuyo nombre coincide exactamente con `token`
    ///
    /// La comparación distingue mayúsculas: `get` no es un método.
    ///
    /// # Ejemplo
    /// ```
    /// use garbage_panda::http::Method;
    ///
    /// assert_eq!(Method::from_bytes(b"PATCH"), Some(Method::PATCH));
    /// assert_eq!(Method::from_bytes(b"get"), None);
    /// ```
    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().as_bytes() == token)
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::CONNECT => "CONNECT",
            Method::DELETE => "DELETE",
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::TRACE => "TRACE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Versión HTTP `major.minor`
///
/// La gramática solo acepta un dígito por componente, así que ambos
/// valores están siempre en `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const HTTP_1_0: Version = Version { major: 1, minor: 0 };
    pub const HTTP_1_1: Version = Version { major: 1, minor: 1 };
}

impl Default for Version {
    fn default() -> Self {
        Version::HTTP_1_1
    }
}

impl std::fmt::Display for Version {
    /// Formato: "HTTP/1.1"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// Representa un request HTTP parseado
///
/// Los campos los llena el parser a medida que avanza; un request solo es
/// confiable si el parser devolvió [`ParseResult::Ok`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método HTTP
    pub(crate) method: Method,

    /// Recurso tal cual aparece en la request line (ej: "/hello?x=1")
    pub(crate) resource: String,

    /// Versión HTTP de la request line
    pub(crate) version: Version,

    /// Headers con el nombre en minúsculas y el valor sin espacios alrededor
    pub(crate) headers: HashMap<String, String>,

    /// Bytes restantes de la conexión después de los headers
    pub(crate) body: Vec<u8>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::GET,
            resource: String::new(),
            version: Version::default(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }
}

impl Request {
    /// Parsea un request completo desde un buffer en memoria
    ///
    /// Atajo sobre [`parser::parse_request`] para tests y handlers que
    /// reciben bytes ya leídos. El `Err` contiene el resultado
    /// [`ParseResult::Malformed`] o [`ParseResult::Partial`].
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use garbage_panda::http::{Method, Request};
    ///
    /// let raw = b"GET /hello?x=1 HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.resource(), "/hello?x=1");
    /// assert_eq!(request.header("host"), Some("x"));
    /// ```
    pub fn parse(mut buffer: &[u8]) -> Result<Self, ParseResult> {
        let mut request = Request::default();
        match parser::parse_request(&mut buffer, &mut request) {
            ParseResult::Ok => Ok(request),
            failure => Err(failure),
        }
    }

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el recurso, sin normalizar
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> Version {
        self.version
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico, sin importar mayúsculas en `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
