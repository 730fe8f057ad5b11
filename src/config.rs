//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de archivos con soporte para argumentos CLI
//! y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server ./server_files 8080 --workers 5 --queue-capacity 512
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! SERVE_DIR=./server_files HTTP_PORT=8080 WORKERS=8 ./file_server
//! ```

use crate::error::ConfigError;
use crate::queue::DEFAULT_CAPACITY;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Configuración del servidor HTTP/1.0 de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor HTTP/1.0 de archivos con pool de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Directorio a servir (los paths se resuelven relativos a él)
    #[arg(value_name = "DIRECTORY", env = "SERVE_DIR")]
    pub serve_dir: PathBuf,

    /// Puerto en el que escucha el servidor
    #[arg(value_name = "PORT", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Número de workers del pool
    #[arg(short, long, default_value = "5", env = "WORKERS")]
    pub workers: usize,

    /// Capacidad de la cola de conexiones pendientes
    #[arg(long = "queue-capacity", default_value_t = DEFAULT_CAPACITY, env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Filtro de logs (sintaxis de `RUST_LOG`, ej: "info,file_server=debug")
    #[arg(long = "log", default_value = "info", env = "RUST_LOG")]
    pub log_filter: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// El directorio servido tiene que existir antes de arrancar.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::EmptyQueue);
        }

        let display = self.serve_dir.display().to_string();
        match std::fs::metadata(&self.serve_dir) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(ConfigError::NotADirectory(display)),
            Err(_) => Err(ConfigError::MissingDirectory(display)),
        }
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        info!(
            address = %self.address(),
            serve_dir = %self.serve_dir.display(),
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            "file server configuration"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            serve_dir: PathBuf::from("."),
            port: 8080,
            host: "0.0.0.0".to_string(),
            workers: 5,
            queue_capacity: DEFAULT_CAPACITY,
            log_filter: "info".to_string(),
        }
    }
}
