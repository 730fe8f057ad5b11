//! # Lectura de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Solo se interpreta la request line; del resto del request (headers,
//! body) no se usa nada, pero hay que sacarlo del socket antes de
//! responder.
//!
//! ```text
//! GET /index.html HTTP/1.0\r\n      <- de aquí sale el ResourcePath
//! Host: localhost:8080\r\n          <- se descarta
//! \r\n
//! ```
//!
//! Todos los métodos se tratan igual: no hay dispatch por método.

use crate::error::RequestError;
use std::io::{ErrorKind, Read};

/// Tamaño del buffer de lectura (request) y de escritura (archivos)
pub const BUF_SIZE: usize = 512;

/// Path absoluto pedido por el cliente, siempre empieza con `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_line_end(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

/// Extrae el resource path de la primera línea del request
///
/// # Ejemplo
///
/// ```
/// use file_server::http::request::parse_request_line;
///
/// let path = parse_request_line(b"GET /gatsby.txt HTTP/1.0\r\n\r\n").unwrap();
/// assert_eq!(path.as_str(), "/gatsby.txt");
/// ```
pub fn parse_request_line(bytes: &[u8]) -> Result<ResourcePath, RequestError> {
    // 1. Avanzar hasta el '/' que abre el target
    let start = bytes
        .iter()
        .position(|&b| b == b'/' || is_line_end(b))
        .ok_or(RequestError::MalformedRequest("no resource path on request line"))?;

    if is_line_end(bytes[start]) {
        return Err(RequestError::MalformedRequest("no resource path on request line"));
    }

    // 2. Copiar hasta el siguiente espacio; un fin de línea antes es un request incompleto
    let target = &bytes[start..];
    let end = target
        .iter()
        .position(|&b| b == b' ' || is_line_end(b))
        .ok_or(RequestError::MalformedRequest("request line incomplete"))?;

    if target[end] != b' ' {
        return Err(RequestError::MalformedRequest("request line incomplete"));
    }

    let path = std::str::from_utf8(&target[..end])
        .map_err(|_| RequestError::MalformedRequest("resource path is not UTF-8"))?;

    Ok(ResourcePath(path.to_string()))
}

/// `read` que reintenta si lo interrumpe una señal
fn read_chunk<R: Read>(conn: &mut R, buf: &mut [u8]) -> Result<usize, RequestError> {
    loop {
        match conn.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(RequestError::Io(e)),
        }
    }
}

/// Lee un request de la conexión y retorna el resource path
///
/// Si la primera lectura llenó el buffer completo, sigue leyendo y
/// descartando hasta que una lectura devuelva menos que `BUF_SIZE` (o 0):
/// el peer puede no cerrar su lado de escritura hasta que todo el
/// request haya salido.
pub fn read_request<R: Read>(conn: &mut R) -> Result<ResourcePath, RequestError> {
    let mut buf = [0u8; BUF_SIZE];

    let nbytes = read_chunk(conn, &mut buf)?;
    if nbytes == 0 {
        return Err(RequestError::EmptyRequest);
    }

    let path = parse_request_line(&buf[..nbytes])?;

    if nbytes == BUF_SIZE {
        let mut drained = 0usize;
        loop {
            let n = read_chunk(conn, &mut buf)?;
            drained += n;
            if n < BUF_SIZE {
                break;
            }
        }
        tracing::trace!(drained, "discarded remainder of request");
    }

    Ok(path)
}
