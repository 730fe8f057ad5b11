//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.0 de archivos.
//!
//! Uso: `file_server <DIRECTORY> <PORT>`. Exit code 0 si el apagado fue
//! limpio, 1 si falló el bind, un accept, la cola o algún worker.

use file_server::config::Config;
use file_server::server::{spawn_signal_listener, Server};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let config = Config::new();
    init_logging(&config.log_filter);
    config.print_summary();

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "💥 setup failed");
            return ExitCode::FAILURE;
        }
    };

    // Sin handler de SIGINT no hay forma de apagar ordenadamente
    if let Err(e) = spawn_signal_listener(server.shutdown_handle()) {
        error!(error = %e, "failed to install SIGINT handler");
        server.shutdown_handle().trigger();
        let _ = server.run();
        return ExitCode::FAILURE;
    }

    match server.run() {
        Ok(report) => {
            info!(
                accepted = report.accepted,
                handled = report.handled,
                "✅ clean shutdown"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "💥 server stopped with errors");
            ExitCode::FAILURE
        }
    }
}
