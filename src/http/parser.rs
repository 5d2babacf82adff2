//! # Parser HTTP/1.1 byte a byte
//! src/http/parser.rs
//!
//! El request se lee de a un byte y cada byte avanza una máquina de
//! estados. Hay dos máquinas:
//!
//! ```text
//! Request line:
//!   Begin → Method → SpaceBeforeResource → Resource → SpaceAfterResource
//!     → H → HT → HTT → HTTP → BeforeVersion → MajorVersion → AfterMajor
//!     → MinorVersion → SpaceAfterVersion → AlmostDone → Ok
//!
//! Headers:
//!   Begin → Key → Colon → Value → NextField → Begin ...
//!   Begin → (CR) AlmostDone → (LF) Ok
//! ```
//!
//! Cada estado se nombra por lo que ya se consumió: en `HTT` ya se leyó
//! `HTT` y se espera la `P`.
//!
//! Las transiciones son funciones puras `(estado, byte) -> (estado, evento)`
//! ([`LineState::advance`], [`FieldState::advance`]). Los drivers
//! ([`parse_request_line`], [`parse_fields`]) leen bytes, aplican los
//! eventos sobre el [`Request`] y convierten los errores de lectura en
//! [`ParseResult::Partial`].
//!
//! ## Límites conocidos
//!
//! - La versión solo admite un dígito por componente (`HTTP/1.1`, no `HTTP/1.10`).
//! - El body no tiene framing: se lee todo lo que llegue hasta EOF, timeout
//!   o error. `Content-Length` y `Transfer-Encoding` se ignoran.

use std::io::Read;

use tracing::{trace, warn};

use super::request::{Method, Request};

/// Máximo de bytes de la request line, incluyendo el CRLF final
pub const MAX_REQUEST_LINE: usize = 8192;

/// Máximo de bytes de cada header, incluyendo el CRLF final
pub const MAX_FIELD: usize = 8192;

/// Tamaño de cada lectura del body
pub const BODY_CHUNK: usize = 8192;

/// Resultado de parsear un request
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    /// La gramática se completó
    Ok,

    /// El input viola la gramática (o excede los límites)
    Malformed,

    /// El input terminó, falló o hizo timeout antes de completarse
    Partial,
}

// ==================== Clases de caracteres ====================

const fn token_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                    | b'`' | b'|' | b'~'
            );
        i += 1;
    }
    table
}

const fn value_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        // HTAB, SP, VCHAR y obs-text
        table[i] = b == b'\t' || b == b' ' || (b >= 0x21 && b <= 0x7E) || b >= 0x80;
        i += 1;
    }
    table
}

static TOKEN_CHARS: [bool; 256] = token_table();
static VALUE_CHARS: [bool; 256] = value_table();

/// ¿Puede `b` aparecer en el nombre de un header?
pub fn is_token_char(b: u8) -> bool {
    TOKEN_CHARS[b as usize]
}

/// ¿Puede `b` aparecer en el valor de un header?
pub fn is_value_char(b: u8) -> bool {
    VALUE_CHARS[b as usize]
}

// ==================== Request line ====================

/// Estados de la máquina de la request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Begin,
    Method,
    SpaceBeforeResource,
    Resource,
    SpaceAfterResource,
    H,
    HT,
    HTT,
    HTTP,
    BeforeVersion,
    MajorVersion,
    AfterMajor,
    MinorVersion,
    SpaceAfterVersion,
    AlmostDone,
}

/// Qué hacer con el byte recién consumido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// Nada, el byte solo mueve el estado
    Skip,

    /// Agregar el byte al token actual (método o recurso)
    Push,

    /// El token actual es el método completo
    MethodEnd,

    /// El token actual es el recurso completo
    ResourceEnd,

    /// Dígito de la versión mayor
    Major(u8),

    /// Dígito de la versión menor
    Minor(u8),

    /// Request line completa
    Done,
}

/// Tramos literales de `HTTP/`: (estado, byte esperado, siguiente estado)
const LITERALS: [(LineState, u8, LineState); 5] = [
    (LineState::SpaceAfterResource, b'H', LineState::H),
    (LineState::H, b'T', LineState::HT),
    (LineState::HT, b'T', LineState::HTT),
    (LineState::HTT, b'P', LineState::HTTP),
    (LineState::HTTP, b'/', LineState::BeforeVersion),
];

impl LineState {
    /// Transición pura: `None` significa request malformado
    ///
    /// # Ejemplo
    /// ```
    /// use garbage_panda::http::parser::{LineEvent, LineState};
    ///
    /// assert_eq!(LineState::HTT.advance(b'P'), Some((LineState::HTTP, LineEvent::Skip)));
    /// assert_eq!(LineState::HTT.advance(b'X'), None);
    /// ```
    pub fn advance(self, byte: u8) -> Option<(LineState, LineEvent)> {
        if let Some(&(_, expected, next)) = LITERALS.iter().find(|(state, _, _)| *state == self) {
            return (byte == expected).then_some((next, LineEvent::Skip));
        }

        let step = match self {
            Self::Begin if byte.is_ascii_alphabetic() => (Self::Method, LineEvent::Push),
            Self::Method if byte == b' ' => (Self::SpaceBeforeResource, LineEvent::MethodEnd),
            Self::Method if byte.is_ascii_alphabetic() => (Self::Method, LineEvent::Push),
            Self::SpaceBeforeResource if byte == b'/' => (Self::Resource, LineEvent::Push),
            Self::Resource if byte == b' ' => (Self::SpaceAfterResource, LineEvent::ResourceEnd),
            Self::Resource => (Self::Resource, LineEvent::Push),
            Self::BeforeVersion if byte.is_ascii_digit() => {
                (Self::MajorVersion, LineEvent::Major(byte - b'0'))
            }
            Self::MajorVersion if byte == b'.' => (Self::AfterMajor, LineEvent::Skip),
            Self::AfterMajor if byte.is_ascii_digit() => {
                (Self::MinorVersion, LineEvent::Minor(byte - b'0'))
            }
            Self::MinorVersion | Self::SpaceAfterVersion if byte == b' ' => {
                (Self::SpaceAfterVersion, LineEvent::Skip)
            }
            Self::MinorVersion | Self::SpaceAfterVersion if byte == b'\r' => {
                (Self::AlmostDone, LineEvent::Skip)
            }
            Self::AlmostDone if byte == b'\n' => (Self::AlmostDone, LineEvent::Done),
            _ => return None,
        };

        Some(step)
    }
}

/// Parsea la request line y llena método, recurso y versión
pub fn parse_request_line<R: Read + ?Sized>(reader: &mut R, request: &mut Request) -> ParseResult {
    let mut state = LineState::Begin;
    let mut token = Vec::new();
    let mut total_read = 0usize;

    loop {
        let Some(byte) = next_byte(reader) else {
            return ParseResult::Partial;
        };

        total_read += 1;
        if total_read > MAX_REQUEST_LINE {
            warn!("Request line excede {} bytes", MAX_REQUEST_LINE);
            return ParseResult::Malformed;
        }

        let Some((next, event)) = state.advance(byte) else {
            trace!(?state, byte, "Byte inválido en la request line");
            return ParseResult::Malformed;
        };

        match event {
            LineEvent::Skip => {}
            LineEvent::Push => token.push(byte),
            LineEvent::MethodEnd => {
                match Method::from_bytes(&token) {
                    Some(method) => request.method = method,
                    None => return ParseResult::Malformed,
                }
                token.clear();
            }
            LineEvent::ResourceEnd => {
                request.resource = latin1(&token);
                token.clear();
            }
            LineEvent::Major(digit) => request.version.major = digit,
            LineEvent::Minor(digit) => request.version.minor = digit,
            LineEvent::Done => return ParseResult::Ok,
        }

        state = next;
    }
}

// ==================== Headers ====================

/// Estados de la máquina de headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Begin,
    Key,
    Colon,
    Value,
    NextField,
    AlmostDone,
}

/// Qué hacer con el byte recién consumido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Skip,

    /// Byte del nombre del header
    Name,

    /// Byte del valor del header
    Value,

    /// Header completo: guardarlo en el mapa
    Commit,

    /// Línea vacía: fin de los headers
    Done,
}

impl FieldState {
    /// Transición pura: `None` significa request malformado
    pub fn advance(self, byte: u8) -> Option<(FieldState, FieldEvent)> {
        let step = match self {
            Self::Begin if byte == b'\r' => (Self::AlmostDone, FieldEvent::Skip),
            Self::Begin | Self::Key if is_token_char(byte) => (Self::Key, FieldEvent::Name),
            Self::Key if byte == b':' => (Self::Colon, FieldEvent::Skip),
            Self::Colon if is_value_char(byte) => (Self::Value, FieldEvent::Value),
            Self::Value if byte == b'\r' => (Self::NextField, FieldEvent::Skip),
            Self::Value if is_value_char(byte) => (Self::Value, FieldEvent::Value),
            Self::NextField if byte == b'\n' => (Self::Begin, FieldEvent::Commit),
            Self::AlmostDone if byte == b'\n' => (Self::AlmostDone, FieldEvent::Done),
            _ => return None,
        };

        Some(step)
    }
}

/// Parsea los headers hasta la línea vacía
///
/// El nombre se guarda en minúsculas y el valor sin SP/HTAB alrededor.
/// Si un header se repite, gana el último.
pub fn parse_fields<R: Read + ?Sized>(reader: &mut R, request: &mut Request) -> ParseResult {
    let mut state = FieldState::Begin;
    let mut name = Vec::new();
    let mut value = Vec::new();
    let mut field_read = 0usize;

    loop {
        let Some(byte) = next_byte(reader) else {
            return ParseResult::Partial;
        };

        field_read += 1;
        if field_read > MAX_FIELD {
            warn!("Header excede {} bytes", MAX_FIELD);
            return ParseResult::Malformed;
        }

        let Some((next, event)) = state.advance(byte) else {
            trace!(?state, byte, "Byte inválido en los headers");
            return ParseResult::Malformed;
        };

        match event {
            FieldEvent::Skip => {}
            FieldEvent::Name => name.push(byte),
            FieldEvent::Value => value.push(byte),
            FieldEvent::Commit => {
                let key = latin1(&name).to_ascii_lowercase();
                let val = latin1(&value)
                    .trim_matches(|c| c == ' ' || c == '\t')
                    .to_string();
                request.headers.insert(key, val);

                name.clear();
                value.clear();
                field_read = 0;
            }
            FieldEvent::Done => return ParseResult::Ok,
        }

        state = next;
    }
}

// ==================== Body ====================

/// Lee todo lo que quede en la conexión
///
/// Se detiene en EOF, timeout o cualquier error de lectura: todos se
/// toman como fin del body. No hay límite de tamaño más allá de lo que el
/// peer envíe antes del timeout.
pub fn drain_body<R: Read + ?Sized>(reader: &mut R) -> Vec<u8> {
    let mut body = Vec::new();
    let mut chunk = [0u8; BODY_CHUNK];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
            Err(e) => {
                trace!("Fin del body por error de lectura: {}", e);
                break;
            }
        }
    }

    body
}

// ==================== Request completo ====================

/// Parsea request line, headers y body
///
/// # Ejemplo
///
/// ```
/// use garbage_panda::http::Request;
/// use garbage_panda::http::parser::{parse_request, ParseResult};
///
/// let mut input: &[u8] = b"GET /hello HTTP/1.1\r\nHost: x\r\n\r\n";
/// let mut request = Request::default();
///
/// assert_eq!(parse_request(&mut input, &mut request), ParseResult::Ok);
/// assert_eq!(request.resource(), "/hello");
/// ```
pub fn parse_request<R: Read + ?Sized>(reader: &mut R, request: &mut Request) -> ParseResult {
    match parse_request_line(reader, request) {
        ParseResult::Ok => {}
        failure => return failure,
    }

    match parse_fields(reader, request) {
        ParseResult::Ok => {}
        failure => return failure,
    }

    request.body = drain_body(reader);

    ParseResult::Ok
}

/// Lee un byte; EOF, timeout o error cuentan igual
fn next_byte<R: Read + ?Sized>(reader: &mut R) -> Option<u8> {
    let mut byte = [0u8; 1];
    match reader.read(&mut byte) {
        Ok(1) => Some(byte[0]),
        Ok(_) => None,
        Err(e) => {
            trace!("Lectura interrumpida: {}", e);
            None
        }
    }
}

/// Bytes a String, un char por byte (ISO-8859-1)
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
