//! Test del handler de SIGINT
//! tests/signal_test.rs
//!
//! Va en su propio binario: el handler queda instalado para todo el
//! proceso y le manda SIGINT al propio proceso de test.

use file_server::config::Config;
use file_server::server::{spawn_signal_listener, Server};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[cfg(unix)]
#[test]
fn test_sigint_stops_server_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        serve_dir: dir.path().to_path_buf(),
        port: 0,
        host: "127.0.0.1".to_string(),
        workers: 2,
        queue_capacity: 4,
        log_filter: "info".to_string(),
    };

    let server = Server::bind(&config).expect("Failed to start server");
    let handle = server.shutdown_handle();
    spawn_signal_listener(handle.clone()).expect("Failed to install SIGINT handler");
    let runner = thread::spawn(move || server.run());

    let status = Command::new("kill")
        .arg("-INT")
        .arg(std::process::id().to_string())
        .status()
        .expect("Failed to run kill");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.is_triggered() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }

    // Si la señal no llegó, apagar igual para que el test no quede colgado
    let triggered = handle.is_triggered();
    handle.trigger();

    let report = runner.join().unwrap();
    assert!(triggered, "SIGINT did not trigger shutdown");
    assert!(report.is_ok());
}
