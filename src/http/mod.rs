//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Codec mínimo de HTTP/1.0 para servir archivos, implementado desde cero:
//!
//! - Lectura de la request line y descarte del resto del request
//! - Resolución del archivo pedido dentro del directorio servido
//! - Tabla fija de tipos MIME
//! - Escritura de status line, headers y body en chunks
//!
//! ## Protocolo HTTP/1.0
//!
//! El protocolo HTTP/1.0 (RFC 1945) es más simple que HTTP/1.1:
//! - No requiere el header `Host`
//! - No tiene chunked transfer encoding
//! - No mantiene conexiones persistentes por defecto
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path HTTP/1.0\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hola!
//! ```

pub mod mime;
pub mod request;
pub mod resolve;
pub mod response;
pub mod status;

pub use request::{read_request, ResourcePath};
pub use resolve::{resolve, FileOutcome};
pub use response::{write_response, ResponseHead};
pub use status::StatusCode;
