//! # File Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 de archivos con un pool fijo de workers que toman
//! conexiones de una cola acotada compartida, implementado desde cero para
//! demostrar conceptos de sistemas operativos: productor/consumidor,
//! sincronización con mutex + condvars y apagado ordenado.
//!
//! ## Arquitectura
//!
//! ```text
//! Listener ──accept──▶ ConnectionQueue ──dequeue──▶ Worker (x N)
//!                                                     │
//!                                   read_request → resolve → write_response
//! ```
//!
//! - `queue`: cola acotada (ring buffer) con bloqueo y shutdown
//! - `http`: codec mínimo de HTTP/1.0 (request line, MIME, respuestas)
//! - `pool`: workers que atienden conexiones
//! - `server`: listener, máquina de estados y señal de apagado
//! - `metrics`: contadores reportados al terminar
//! - `config`: argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::{spawn_signal_listener, Server};
//!
//! let config = Config::new();
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! spawn_signal_listener(server.shutdown_handle()).expect("Error al instalar SIGINT");
//! server.run().expect("Error fatal");
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod pool;
pub mod queue;
pub mod server;
