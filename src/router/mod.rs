//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea recursos a handlers, códigos de error a bodies, y un prefijo a un
//! directorio de archivos estáticos.
//!
//! ## Arquitectura
//!
//! ```text
//! RouterBuilder ──build()──► Router (solo lectura, compartido por los workers)
//!
//! ParseResult + Request → Router::dispatch → Response
//!                              ├─ prefijo estático → StaticMount
//!                              ├─ ruta exacta      → Handler
//!                              └─ sin ruta         → body de 404
//! ```
//!
//! Las tablas se llenan en el builder antes de arrancar el servidor. El
//! [`Router`] no tiene métodos que las modifiquen, así que los workers lo
//! comparten por referencia sin locks.

pub mod static_files;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, ServerError};
use crate::http::{ParseResult, Request, Response, StatusCode};

pub use static_files::{StaticFile, StaticMount};

/// Handler de una ruta: recibe el Request y retorna una Response
pub type Handler = Box<dyn Fn(&Request) -> Response + Send + Sync>;

/// Productor del body de una respuesta de error
pub type ErrorBody = Box<dyn Fn() -> Vec<u8> + Send + Sync>;

/// Códigos que siempre tienen un body (vacío si nadie lo reemplaza)
const DEFAULT_ERRORS: [StatusCode; 3] = [
    StatusCode::BadRequest,
    StatusCode::Forbidden,
    StatusCode::NotFound,
];

/// Tablas en construcción
pub struct RouterBuilder {
    routes: HashMap<String, Handler>,
    errors: HashMap<StatusCode, ErrorBody>,
    static_mount: Option<StaticMount>,
}

impl RouterBuilder {
    /// Crea un builder sin rutas y con bodies vacíos para 400, 403 y 404
    pub fn new() -> Self {
        let mut errors: HashMap<StatusCode, ErrorBody> = HashMap::new();
        for status in DEFAULT_ERRORS {
            errors.insert(status, Box::new(Vec::<u8>::new));
        }

        Self {
            routes: HashMap::new(),
            errors,
            static_mount: None,
        }
    }

    /// Registra una ruta con su handler
    ///
    /// La ruta se compara de forma exacta contra el recurso del request,
    /// query string incluida. Registrar la misma ruta dos veces reemplaza
    /// el handler.
    ///
    /// # Ejemplo
    /// ```
    /// use garbage_panda::router::RouterBuilder;
    /// use garbage_panda::http::{Request, Response, StatusCode};
    ///
    /// fn hello_handler(_req: &Request) -> Response {
    ///     Response::new(StatusCode::Ok).with_body("bruh")
    /// }
    ///
    /// let mut builder = RouterBuilder::new();
    /// builder.register("/hello", hello_handler);
    /// let router = builder.build();
    /// assert!(router.has_route("/hello"));
    /// ```
    pub fn register<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.routes.insert(path.to_string(), Box::new(handler));
    }

    /// Registra el productor del body para un código de error
    ///
    /// Solo se aceptan códigos 4xx y 5xx.
    pub fn register_error<F>(&mut self, status: StatusCode, producer: F) -> Result<()>
    where
        F: Fn() -> Vec<u8> + Send + Sync + 'static,
    {
        if !status.is_error() {
            return Err(ServerError::InvalidErrorStatus(status));
        }

        self.errors.insert(status, Box::new(producer));
        Ok(())
    }

    /// Monta `dir` bajo el prefijo `prefix`
    ///
    /// Reemplaza cualquier montaje anterior.
    pub fn set_static_root(&mut self, prefix: &str, dir: impl AsRef<Path>) -> Result<()> {
        self.static_mount = Some(StaticMount::new(prefix, dir)?);
        Ok(())
    }

    /// Sella las tablas
    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
            errors: self.errors,
            static_mount: self.static_mount,
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Tablas selladas: rutas, bodies de error y montaje estático
pub struct Router {
    routes: HashMap<String, Handler>,
    errors: HashMap<StatusCode, ErrorBody>,
    static_mount: Option<StaticMount>,
}

impl Router {
    /// Atajo para [`RouterBuilder::new`]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// ¿Hay un handler para exactamente este recurso?
    pub fn has_route(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Montaje estático, si se configuró
    pub fn static_mount(&self) -> Option<&StaticMount> {
        self.static_mount.as_ref()
    }

    /// Body registrado para `status`, o vacío si no hay productor
    pub fn error_body(&self, status: StatusCode) -> Vec<u8> {
        self.errors.get(&status).map(|producer| producer()).unwrap_or_default()
    }

    /// Respuesta de error con el body registrado
    pub fn error_response(&self, status: StatusCode) -> Response {
        Response::new(status).with_body_bytes(self.error_body(status))
    }

    /// Decide qué responder según el resultado del parser
    ///
    /// - `Malformed` → 400 con el body registrado
    /// - `Partial` → `None`: se cierra la conexión sin responder. El
    ///   productor del 400 igual se ejecuta y su body se descarta.
    /// - `Ok` → [`Router::route`]
    pub fn dispatch(&self, result: ParseResult, request: &Request) -> Option<Response> {
        match result {
            ParseResult::Ok => Some(self.route(request)),
            ParseResult::Malformed => Some(self.error_response(StatusCode::BadRequest)),
            ParseResult::Partial => {
                let _ = self.error_body(StatusCode::BadRequest);
                None
            }
        }
    }

    /// Encuentra y ejecuta el handler apropiado para un request válido
    ///
    /// Si el recurso empieza con el prefijo estático se sirve desde disco;
    /// si no, se busca la ruta exacta. Sin ruta → 404.
    pub fn route(&self, request: &Request) -> Response {
        let resource = request.resource();

        if let Some(mount) = &self.static_mount {
            if mount.matches(resource) {
                return self.serve_static(mount, resource);
            }
        }

        match self.routes.get(resource) {
            Some(handler) => handler(request),
            None => {
                debug!("Ruta no encontrada: {}", resource);
                self.error_response(StatusCode::NotFound)
            }
        }
    }

    fn serve_static(&self, mount: &StaticMount, resource: &str) -> Response {
        match mount.resolve(resource) {
            StaticFile::Found { path, bytes } => Response::new(StatusCode::Ok)
                .with_header("Content-Type", static_files::content_type(&path))
                .with_body_bytes(bytes),
            StaticFile::NotFound => self.error_response(StatusCode::NotFound),
            StaticFile::Escaped => self.error_response(StatusCode::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn hello_handler(_req: &Request) -> Response {
        Response::new(StatusCode::Ok).with_body("bruh")
    }

    fn echo_handler(req: &Request) -> Response {
        Response::new(StatusCode::Ok).with_body(&format!("{} {}", req.method(), req.resource()))
    }

    fn request(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap()
    }

    fn not_found_body() -> Vec<u8> {
        b"<h1>Not<br>Found</h1>".to_vec()
    }

    #[test]
    fn test_route_found() {
        let mut builder = Router::builder();
        builder.register("/hello", hello_handler);
        let router = builder.build();

        let response = router.route(&request(b"GET /hello HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"bruh");
    }

    #[test]
    fn test_handler_receives_request() {
        let mut builder = Router::builder();
        builder.register("/echo", echo_handler);
        let router = builder.build();

        let response = router.route(&request(b"DELETE /echo HTTP/1.1\r\n\r\n"));
        assert_eq!(response.body(), b"DELETE /echo");
    }

    #[test]
    fn test_closure_handler() {
        let greeting = String::from("hola");
        let mut builder = Router::builder();
        builder.register("/greet", move |_req: &Request| {
            Response::new(StatusCode::Ok).with_body(&greeting)
        });
        let router = builder.build();

        assert_eq!(router.route(&request(b"GET /greet HTTP/1.1\r\n\r\n")).body(), b"hola");
    }

    #[test]
    fn test_route_match_is_exact() {
        let mut builder = Router::builder();
        builder.register("/hello", hello_handler);
        builder.register_error(StatusCode::NotFound, not_found_body).unwrap();
        let router = builder.build();

        for raw in [
            &b"GET /hello?x=1 HTTP/1.1\r\n\r\n"[..],
            b"GET /hello/ HTTP/1.1\r\n\r\n",
            b"GET /Hello HTTP/1.1\r\n\r\n",
        ] {
            let response = router.route(&request(raw));
            assert_eq!(response.status(), StatusCode::NotFound);
            assert_eq!(response.body(), b"<h1>Not<br>Found</h1>");
        }
    }

    #[test]
    fn test_default_error_bodies_are_empty() {
        let router = Router::builder().build();

        for status in [StatusCode::BadRequest, StatusCode::Forbidden, StatusCode::NotFound] {
            assert!(router.error_body(status).is_empty());
        }
        assert!(router.error_body(StatusCode::ServiceUnavailable).is_empty());

        let response = router.route(&request(b"GET /missing HTTP/1.1\r\n\r\n"));
        assert_eq!(response.to_bytes(), b"HTTP/1.1 404 Not Found\r\n\r\n");
    }

    #[test]
    fn test_register_error_validates_category() {
        let mut builder = Router::builder();

        assert!(builder.register_error(StatusCode::ServiceUnavailable, Vec::new).is_ok());
        assert!(builder.register_error(StatusCode::Forbidden, Vec::new).is_ok());

        for status in [StatusCode::Ok, StatusCode::NoContent, StatusCode::Found] {
            let result = builder.register_error(status, Vec::new);
            assert!(matches!(result, Err(ServerError::InvalidErrorStatus(s)) if s == status));
        }
    }

    #[test]
    fn test_dispatch_outcomes() {
        let mut builder = Router::builder();
        builder.register("/hello", hello_handler);
        builder
            .register_error(StatusCode::BadRequest, || b"bad".to_vec())
            .unwrap();
        let router = builder.build();
        let req = request(b"GET /hello HTTP/1.1\r\n\r\n");

        let ok = router.dispatch(ParseResult::Ok, &req).unwrap();
        assert_eq!(ok.body(), b"bruh");

        let malformed = router.dispatch(ParseResult::Malformed, &Request::default()).unwrap();
        assert_eq!(malformed.status(), StatusCode::BadRequest);
        assert_eq!(malformed.body(), b"bad");

        assert!(router.dispatch(ParseResult::Partial, &Request::default()).is_none());
    }

    #[test]
    fn test_partial_runs_bad_request_producer() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let mut builder = Router::builder();
        let counter = Arc::clone(&calls);
        builder
            .register_error(StatusCode::BadRequest, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                b"bad".to_vec()
            })
            .unwrap();
        let router = builder.build();

        assert!(router.dispatch(ParseResult::Partial, &Request::default()).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(router.dispatch(ParseResult::Malformed, &Request::default()).is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prefix_needs_segment_boundary() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("static");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("index.html"), b"<p>hi</p>").unwrap();

        let mut builder = Router::builder();
        builder.set_static_root("/static", &root).unwrap();
        builder.register_error(StatusCode::NotFound, not_found_body).unwrap();
        let router = builder.build();

        let response = router.route(&request(b"GET /staticindex.html HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body(), b"<h1>Not<br>Found</h1>");
    }

    #[test]
    fn test_missing_static_root_answers_not_found() {
        let tmp = tempfile::tempdir().unwrap();

        let mut builder = Router::builder();
        builder.set_static_root("/static", tmp.path().join("static")).unwrap();
        builder.register("/hello", hello_handler);
        let router = builder.build();

        let missing = router.route(&request(b"GET /static/x HTTP/1.1\r\n\r\n"));
        assert_eq!(missing.status(), StatusCode::NotFound);

        let hello = router.route(&request(b"GET /hello HTTP/1.1\r\n\r\n"));
        assert_eq!(hello.body(), b"bruh");
    }

    #[test]
    fn test_static_dispatch() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("static");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("index.html"), b"<p>hi</p>").unwrap();

        let mut builder = Router::builder();
        builder.set_static_root("/static", &root).unwrap();
        builder.register_error(StatusCode::NotFound, not_found_body).unwrap();
        builder.register_error(StatusCode::Forbidden, || b"nope".to_vec()).unwrap();
        builder.register("/static/virtual", hello_handler);
        let router = builder.build();

        let ok = router.route(&request(b"GET /static/index.html HTTP/1.1\r\n\r\n"));
        assert_eq!(ok.status(), StatusCode::Ok);
        assert_eq!(ok.body(), b"<p>hi</p>");
        assert_eq!(ok.headers().get("Content-Type"), Some(&"text/html".to_string()));

        let forbidden = router.route(&request(b"GET /static/../../etc/passwd HTTP/1.1\r\n\r\n"));
        assert_eq!(forbidden.status(), StatusCode::Forbidden);
        assert_eq!(forbidden.body(), b"nope");

        let missing = router.route(&request(b"GET /static/missing.html HTTP/1.1\r\n\r\n"));
        assert_eq!(missing.status(), StatusCode::NotFound);
        assert_eq!(missing.body(), b"<h1>Not<br>Found</h1>");

        // El prefijo estático tiene prioridad sobre las rutas
        let shadowed = router.route(&request(b"GET /static/virtual HTTP/1.1\r\n\r\n"));
        assert_eq!(shadowed.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_no_static_mount_means_routes_only() {
        let router = Router::builder().build();
        assert!(router.static_mount().is_none());

        let response = router.route(&request(b"GET /static/index.html HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::NotFound);
    }
}
