//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores, separada por alcance:
//!
//! - [`QueueError`]: fallo de sincronización de la cola (fatal)
//! - [`RequestError`]: fallo local a una conexión (el worker sigue)
//! - [`ConfigError`]: configuración inválida (el proceso no arranca)
//! - [`ServerError`]: errores que llegan al dispatcher y cambian el exit code
//!
//! `NotFound` y `UnsupportedType` no aparecen aquí: son respuestas
//! válidas del protocolo (404/415), no errores.

use thiserror::Error;

/// Errores de la cola de conexiones
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Un thread hizo panic con el lock tomado; el estado compartido ya no es confiable
    #[error("connection queue lock poisoned")]
    Poisoned,

    /// `destroy` fue llamado mientras otro owner (un worker) sigue vivo
    #[error("connection queue still shared by {owners} owner(s)")]
    InUse { owners: usize },
}

/// Errores al procesar una conexión individual
#[derive(Debug, Error)]
pub enum RequestError {
    /// El peer cerró sin mandar ningún byte
    #[error("empty request")]
    EmptyRequest,

    /// La request line no trae un path válido
    #[error("malformed request: {0}")]
    MalformedRequest(&'static str),

    /// Fallo de lectura/escritura sobre el socket o el archivo servido
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errores de validación de la configuración
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("workers must be >= 1")]
    NoWorkers,

    #[error("queue capacity must be >= 1")]
    EmptyQueue,

    #[error("directory to serve does not exist: {0}")]
    MissingDirectory(String),

    #[error("path to serve is not a directory: {0}")]
    NotADirectory(String),
}

/// Errores fatales reportados por el dispatcher
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    #[error("queue failure: {0}")]
    Queue(#[from] QueueError),

    #[error("worker {id} panicked")]
    WorkerPanicked { id: usize },

    #[error("worker {id} stopped: {source}")]
    Worker {
        id: usize,
        #[source]
        source: QueueError,
    },
}
