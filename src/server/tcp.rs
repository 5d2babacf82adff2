//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor TCP que atiende cada conexión en su propio thread.
//!
//! ## Ciclo de vida
//!
//! ```text
//! bind (SO_REUSEADDR, backlog 100)
//!   └─ run: thread::scope
//!        ├─ acquire permit ─ accept ─ spawn worker ─┐
//!        │        ▲                                 │
//!        │        └─────────────────────────────────┘
//!        └─ shutdown: sale del loop, el scope espera a todos los workers
//! ```
//!
//! Cada worker es dueño de su `TcpStream` y solo comparte el [`Router`],
//! que es de solo lectura. Un request por conexión: parsear, despachar,
//! escribir la respuesta en un solo `write_all` y cerrar.

use std::io::{self, BufReader, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::http::{parser, ParseResult, Request};
use crate::router::Router;
use crate::server::limit::ConnectionLimit;

/// Conexiones pendientes que acepta el kernel antes de rechazar
pub const BACKLOG: i32 = 100;

/// Bytes que se descartan después de responder a un request malformado
const LINGER_LIMIT: u64 = 64 * 1024;

/// Servidor HTTP con un thread por conexión
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    limit: ConnectionLimit,
    read_timeout: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Abre el socket de escucha
    ///
    /// Con `port == 0` el sistema elige un puerto libre; ver
    /// [`Server::local_addr`].
    pub fn bind(config: &Config, router: Router) -> Result<Self> {
        let address = config.address();
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid address {}: {}", address, e)))?;

        let bind_error = |source: io::Error| ServerError::Bind {
            address: address.clone(),
            source,
        };

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(bind_error)?;
        socket.set_reuse_address(true).map_err(bind_error)?;
        socket.bind(&addr.into()).map_err(bind_error)?;

        let listen_error = |source: io::Error| ServerError::Listen {
            address: address.clone(),
            source,
        };

        socket.listen(BACKLOG).map_err(listen_error)?;
        let listener: TcpListener = socket.into();
        let local_addr = listener.local_addr().map_err(listen_error)?;

        Ok(Self {
            listener,
            local_addr,
            router,
            limit: ConnectionLimit::new(config.max_connections),
            read_timeout: config.read_timeout(),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Dirección real de escucha
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle para detener el servidor desde otro thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            wake_addr: wake_address(self.local_addr),
        }
    }

    /// Acepta conexiones hasta que se pida el shutdown
    ///
    /// Retorna cuando todos los workers terminaron. El socket de escucha se
    /// cierra al final, después de los workers.
    pub fn run(self) {
        info!("Servidor escuchando en {}", self.local_addr);

        thread::scope(|scope| {
            loop {
                let permit = self.limit.acquire();

                if self.shutdown.load(Ordering::SeqCst) {
                    break;
                }

                let (stream, peer) = match self.listener.accept() {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("Error al aceptar conexión: {}", e);
                        continue;
                    }
                };

                if self.shutdown.load(Ordering::SeqCst) {
                    debug!("Conexión de {} descartada: shutdown en curso", peer);
                    break;
                }

                info!("Nueva conexión desde {} ({} activas)", peer, self.limit.active());

                let router = &self.router;
                let read_timeout = self.read_timeout;

                scope.spawn(move || {
                    let _permit = permit;
                    if let Err(e) = handle_connection(stream, router, read_timeout) {
                        warn!("Error en la conexión con {}: {}", peer, e);
                    }
                });
            }

            info!("Shutdown: esperando {} conexiones activas", self.limit.active());
        });

        info!("Servidor detenido");
    }
}

/// Detiene un [`Server`] que está en [`Server::run`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Marca el shutdown y despierta el `accept`
    ///
    /// `accept` no vuelve por una señal, así que se abre una conexión
    /// propia contra el listener. Llamarlo más de una vez no hace nada.
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Shutdown solicitado");

        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, Duration::from_secs(1)) {
            warn!("No se pudo despertar el accept en {}: {}", self.wake_addr, e);
        }
    }

    /// ¿Ya se pidió el shutdown?
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// `0.0.0.0` y `::` no sirven como destino; se usa loopback
fn wake_address(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}

/// Atiende un request completo sobre `stream`
///
/// Los errores de lectura terminan el parseo (`Partial`) y no llegan aquí;
/// solo se propagan los de configurar el socket y de escribir.
pub fn handle_connection(stream: TcpStream, router: &Router, read_timeout: Duration) -> io::Result<()> {
    let start = Instant::now();
    stream.set_read_timeout(Some(read_timeout))?;

    let mut request = Request::default();
    let result = parser::parse_request(&mut BufReader::new(&stream), &mut request);
    debug!("Resultado del parseo: {:?}", result);

    let Some(response) = router.dispatch(result, &request) else {
        debug!("Request incompleto, se cierra sin responder");
        return Ok(());
    };

    match result {
        ParseResult::Ok => info!(
            "{} {} {} -> {} ({:.2}ms)",
            request.method(),
            request.resource(),
            request.version(),
            response.status(),
            start.elapsed().as_secs_f64() * 1000.0
        ),
        _ => info!("Request malformado -> {}", response.status()),
    }

    let mut writer = &stream;
    writer.write_all(&response.to_bytes())?;
    writer.flush()?;

    // El peer puede haber cerrado primero
    let _ = stream.shutdown(Shutdown::Write);

    // Descartar lo que quedó sin leer para que el close no mande RST
    if result == ParseResult::Malformed {
        let _ = io::copy(&mut (&stream).take(LINGER_LIMIT), &mut io::sink());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Response, StatusCode};
    use crate::router::RouterBuilder;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    fn test_router() -> Router {
        let mut builder = RouterBuilder::new();
        builder.register("/hello", |_req: &Request| {
            Response::new(StatusCode::Ok).with_body("bruh")
        });
        builder.register_error(StatusCode::BadRequest, || b"bad".to_vec()).unwrap();
        builder.build()
    }

    /// Acepta una conexión, la atiende y retorna lo que recibió el cliente
    fn exchange(raw: &[u8], close_write: bool) -> Vec<u8> {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let router = test_router();

        thread::scope(|s| {
            s.spawn(|| {
                let (stream, _) = listener.accept().unwrap();
                handle_connection(stream, &router, Duration::from_millis(100)).unwrap();
            });

            let mut client = TcpStream::connect(addr).unwrap();
            client.write_all(raw).unwrap();
            if close_write {
                client.shutdown(Shutdown::Write).unwrap();
            }

            let mut buf = Vec::new();
            client.read_to_end(&mut buf).unwrap();
            buf
        })
    }

    #[test]
    fn test_handle_connection_ok() {
        let response = exchange(b"GET /hello HTTP/1.1\r\nHost: x\r\n\r\n", true);
        assert_eq!(response, b"HTTP/1.1 200 OK\r\n\r\nbruh");
    }

    #[test]
    fn test_handle_connection_waits_for_timeout_without_eof() {
        // Sin EOF el body termina por timeout de lectura
        let response = exchange(b"GET /hello HTTP/1.1\r\n\r\n", false);
        assert_eq!(response, b"HTTP/1.1 200 OK\r\n\r\nbruh");
    }

    #[test]
    fn test_handle_connection_malformed() {
        let response = exchange(b"FETCH /hello HTTP/1.1\r\n\r\n", true);
        assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n\r\nbad");
    }

    #[test]
    fn test_handle_connection_partial_gets_nothing() {
        let response = exchange(b"GET /hello HTTP/1.1\r\nHost: x\r\n", true);
        assert!(response.is_empty());
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let router = test_router();

        thread::scope(|s| {
            let server = s.spawn(|| {
                let (stream, _) = listener.accept().unwrap();
                handle_connection(stream, &router, Duration::from_millis(100))
            });

            drop(TcpStream::connect(addr).unwrap());
            assert!(server.join().unwrap().is_ok());
        });
    }

    fn test_config() -> Config {
        Config {
            port: 0,
            localhost: true,
            ..Config::default()
        }
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let server = Server::bind(&test_config(), test_router()).unwrap();
        let addr = server.local_addr();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_ne!(addr.port(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_bind_port_in_use() {
        let taken = ephemeral_listener();
        let config = Config {
            port: taken.local_addr().unwrap().port(),
            ..test_config()
        };

        // SO_REUSEADDR no permite dos listeners activos en el mismo puerto
        let result = Server::bind(&config, test_router());
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[test]
    fn test_run_and_shutdown() {
        let server = Server::bind(&test_config(), test_router()).unwrap();
        let addr = server.local_addr();
        let handle = server.shutdown_handle();

        let runner = thread::spawn(move || server.run());

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET /hello HTTP/1.1\r\n\r\n").unwrap();
        client.shutdown(Shutdown::Write).unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"HTTP/1.1 200 OK\r\n\r\nbruh");

        assert!(!handle.is_shutdown());
        handle.shutdown();
        handle.shutdown();
        assert!(handle.is_shutdown());

        runner.join().unwrap();

        // El listener ya se cerró
        assert!(TcpStream::connect_timeout(&addr, Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_wake_address() {
        let any: SocketAddr = "0.0.0.0:1234".parse().unwrap();
        assert_eq!(wake_address(any), "127.0.0.1:1234".parse().unwrap());

        let any6: SocketAddr = "[::]:80".parse().unwrap();
        assert_eq!(wake_address(any6), "[::1]:80".parse().unwrap());

        let fixed: SocketAddr = "10.0.0.5:8080".parse().unwrap();
        assert_eq!(wake_address(fixed), fixed);
    }
}
