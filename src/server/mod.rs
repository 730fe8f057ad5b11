//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el listener/dispatcher que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes
//! 3. Las encola para el pool de workers
//! 4. Coordina el apagado ordenado (drain) al recibir SIGINT

pub mod shutdown;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use shutdown::{spawn_signal_listener, ShutdownHandle};
pub use tcp::{Server, ServerReport, ServerState};
