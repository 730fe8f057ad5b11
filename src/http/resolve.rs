//! # Resolución de Archivos
//! src/http/resolve.rs
//!
//! Traduce un [`ResourcePath`] a un archivo dentro del directorio servido
//! y decide qué respuesta corresponde:
//!
//! | Situación                                   | Resultado         |
//! |---------------------------------------------|-------------------|
//! | No existe / es un directorio / usa `..`     | `NotFound`        |
//! | Existe pero extensión fuera de la tabla     | `UnsupportedType` |
//! | Existe y extensión soportada                | `Found`           |
//!
//! Cualquier otro error de `metadata` (permisos, etc.) se propaga.

use crate::http::mime::mime_for_path;
use crate::http::request::ResourcePath;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Resultado de buscar el archivo pedido
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Found {
        path: PathBuf,
        size: u64,
        mime_type: &'static str,
    },
    NotFound,
    UnsupportedType,
}

/// Convierte el path del request en uno relativo, rechazando cualquier
/// componente que pueda salir del directorio servido
fn relative_path(resource: &ResourcePath) -> Option<PathBuf> {
    let trimmed = resource.as_str().trim_start_matches('/');
    let mut relative = PathBuf::new();

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    Some(relative)
}

/// Busca el recurso dentro de `served_dir`
///
/// # Ejemplo
///
/// ```no_run
/// use file_server::http::request::parse_request_line;
/// use file_server::http::resolve::{resolve, FileOutcome};
/// use std::path::Path;
///
/// let path = parse_request_line(b"GET /missing.txt HTTP/1.0\r\n").unwrap();
/// let outcome = resolve(&path, Path::new("./server_files")).unwrap();
/// assert_eq!(outcome, FileOutcome::NotFound);
/// ```
pub fn resolve(resource: &ResourcePath, served_dir: &Path) -> std::io::Result<FileOutcome> {
    let relative = match relative_path(resource) {
        Some(relative) => relative,
        None => return Ok(FileOutcome::NotFound),
    };

    let path = served_dir.join(relative);

    let metadata = match std::fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FileOutcome::NotFound),
        Err(e) => return Err(e),
    };

    if !metadata.is_file() {
        return Ok(FileOutcome::NotFound);
    }

    match mime_for_path(&path) {
        Some(mime_type) => Ok(FileOutcome::Found {
            path,
            size: metadata.len(),
            mime_type,
        }),
        None => Ok(FileOutcome::UnsupportedType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::parse_request_line;
    use std::fs;
    use tempfile::TempDir;

    fn resource(path: &str) -> ResourcePath {
        parse_request_line(format!("GET {} HTTP/1.0\r\n", path).as_bytes()).unwrap()
    }

    fn served_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hola</h1>").unwrap();
        fs::write(dir.path().join("styles.css"), "body {}").unwrap();
        fs::write(dir.path().join("Makefile"), "all:").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("manual.pdf"), b"%PDF-1.4").unwrap();
        dir
    }

    #[test]
    fn test_found_html() {
        let dir = served_dir();
        let outcome = resolve(&resource("/index.html"), dir.path()).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::Found {
                path: dir.path().join("index.html"),
                size: 13,
                mime_type: "text/html",
            }
        );
    }

    #[test]
    fn test_found_nested() {
        let dir = served_dir();
        let outcome = resolve(&resource("/docs/manual.pdf"), dir.path()).unwrap();
        assert!(matches!(outcome, FileOutcome::Found { size: 8, mime_type: "application/pdf", .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = served_dir();
        let outcome = resolve(&resource("/missing.txt"), dir.path()).unwrap();
        assert_eq!(outcome, FileOutcome::NotFound);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = served_dir();
        assert_eq!(
            resolve(&resource("/styles.css"), dir.path()).unwrap(),
            FileOutcome::UnsupportedType
        );
    }

    #[test]
    fn test_no_extension() {
        let dir = served_dir();
        assert_eq!(
            resolve(&resource("/Makefile"), dir.path()).unwrap(),
            FileOutcome::UnsupportedType
        );
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = served_dir();
        assert_eq!(resolve(&resource("/docs"), dir.path()).unwrap(), FileOutcome::NotFound);
        assert_eq!(resolve(&resource("/"), dir.path()).unwrap(), FileOutcome::NotFound);
    }

    #[test]
    fn test_parent_components_rejected() {
        let dir = served_dir();
        let inner = dir.path().join("docs");
        let outcome = resolve(&resource("/../index.html"), &inner).unwrap();
        assert_eq!(outcome, FileOutcome::NotFound);
    }

    #[test]
    fn test_relative_path_components() {
        assert_eq!(relative_path(&resource("/a/./b.txt")), Some(PathBuf::from("a/b.txt")));
        assert_eq!(relative_path(&resource("//a.txt")), Some(PathBuf::from("a.txt")));
        assert_eq!(relative_path(&resource("/a/../b.txt")), None);
    }
}
