//! # Construcción y Envío de Respuestas HTTP
//! src/http/response.rs
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>hola</h1>
//! ```
//!
//! Para 404/415 no hay `Content-Type` ni body y `Content-Length` es 0.
//! El body de un 200 se copia en chunks de tamaño fijo, nunca se carga
//! el archivo completo en memoria.

use super::request::BUF_SIZE;
use super::resolve::FileOutcome;
use super::StatusCode;
use crate::error::RequestError;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};

/// Status line + headers de una respuesta (el body se escribe aparte)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// Código de estado HTTP (200, 404, 415)
    status: StatusCode,

    /// Headers en el orden en que se escriben
    headers: Vec<(&'static str, String)>,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Arma el encabezado que corresponde a un resultado de `resolve`
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::response::ResponseHead;
    /// use file_server::http::resolve::FileOutcome;
    ///
    /// let head = ResponseHead::for_outcome(&FileOutcome::NotFound);
    /// assert_eq!(head.to_bytes(), b"HTTP/1.0 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    /// ```
    pub fn for_outcome(outcome: &FileOutcome) -> Self {
        match outcome {
            FileOutcome::Found { size, mime_type, .. } => Self::new(StatusCode::Ok)
                .with_header("Content-Type", *mime_type)
                .with_header("Content-Length", size.to_string()),
            FileOutcome::NotFound => {
                Self::new(StatusCode::NotFound).with_header("Content-Length", "0")
            }
            FileOutcome::UnsupportedType => {
                Self::new(StatusCode::UnsupportedMediaType).with_header("Content-Length", "0")
            }
        }
    }

    /// Genera status line, headers y la línea vacía final
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = format!("HTTP/1.0 {}\r\n", self.status).into_bytes();

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(&'static str, String)] {
        &self.headers
    }
}

/// Escribe la respuesta completa para `outcome` sobre la conexión
///
/// Retorna `(status, bytes de body enviados)`. Cualquier fallo de
/// escritura aborta la respuesta; no se reintenta.
pub fn write_response<W: Write>(
    conn: &mut W,
    outcome: &FileOutcome,
) -> Result<(StatusCode, u64), RequestError> {
    let head = ResponseHead::for_outcome(outcome);

    let (path, size) = match outcome {
        FileOutcome::Found { path, size, .. } => (path, *size),
        _ => {
            conn.write_all(&head.to_bytes())?;
            conn.flush()?;
            return Ok((head.status(), 0));
        }
    };

    // Abrir antes de mandar el header: si falla, no se escribe nada
    let file = File::open(path)?;
    conn.write_all(&head.to_bytes())?;

    // Nunca mandar más de lo anunciado en Content-Length
    let mut body = file.take(size);
    let mut buf = [0u8; BUF_SIZE];
    let mut sent = 0u64;

    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(RequestError::Io(e)),
        };
        conn.write_all(&buf[..n])?;
        sent += n as u64;
    }

    // El archivo se achicó después de `resolve`: el body no llega a Content-Length
    if sent != size {
        return Err(RequestError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("file ended after {} of {} bytes", sent, size),
        )));
    }

    conn.flush()?;
    Ok((head.status(), sent))
}
