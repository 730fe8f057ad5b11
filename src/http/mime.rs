//! # Tabla de Tipos MIME
//!
//! Tabla fija y cerrada: cualquier otra extensión (o ninguna) es 415.
//! La comparación distingue mayúsculas (`.TXT` no está soportado).

use std::path::Path;

/// Extensiones soportadas y su Content-Type
const MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("pdf", "application/pdf"),
];

/// Busca el tipo MIME de una extensión (sin el punto)
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Resuelve el tipo MIME a partir de la última extensión del path
///
/// # Ejemplo
/// ```
/// use file_server::http::mime::mime_for_path;
/// use std::path::Path;
///
/// assert_eq!(mime_for_path(Path::new("a.b.c.txt")), Some("text/plain"));
/// assert_eq!(mime_for_path(Path::new("Makefile")), None);
/// ```
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
}
