//! # Listener / Dispatcher
//! src/server/tcp.rs
//!
//! Dueño del socket de escucha. Acepta conexiones y las encola; los
//! workers del pool las atienden.
//!
//! ## Máquina de estados
//!
//! ```text
//! Starting ──▶ Serving ──▶ Draining ──▶ Stopped
//!  bind         accept       queue.shutdown()   destroy queue
//!  cola         enqueue      join workers       cerrar listener
//!  workers
//! ```
//!
//! Un error de `accept` que no sea EINTR es fatal: se deja de aceptar, se
//! pasa directo a `Draining` y se reporta el error al final. La limpieza
//! se hace completa aunque alguna fase falle; se retorna el primer error.

use crate::config::Config;
use crate::error::ServerError;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::pool::WorkerPool;
use crate::queue::ConnectionQueue;
use crate::server::shutdown::ShutdownHandle;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Estados del dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Serving,
    Draining,
    Stopped,
}

/// Resumen de una ejecución terminada sin errores
#[derive(Debug, Clone)]
pub struct ServerReport {
    /// Conexiones aceptadas y encoladas
    pub accepted: u64,

    /// Conexiones atendidas por los workers
    pub handled: usize,

    /// Conexiones que quedaron en la cola al destruirla
    pub discarded: usize,

    pub metrics: MetricsSnapshot,
}

/// Servidor HTTP/1.0 de archivos con pool de workers
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    queue: Arc<ConnectionQueue<TcpStream>>,
    pool: WorkerPool,
    metrics: MetricsCollector,
    shutdown: ShutdownHandle,
    state: ServerState,
}

fn transition(state: &mut ServerState, next: ServerState) {
    let from = *state;
    info!(from = ?from, to = ?next, "server state change");
    *state = next;
}

/// Guarda el primer error fatal; los siguientes solo se loguean
fn record_failure(slot: &mut Option<ServerError>, err: ServerError) {
    error!(error = %err, "fatal server error");
    if slot.is_none() {
        *slot = Some(err);
    }
}

impl Server {
    /// Fase `Starting`: valida la config, hace bind, crea la cola y lanza el pool
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let mut state = ServerState::Starting;
        info!(state = ?state, "starting file server");
        config.validate()?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            addr: address.clone(),
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: address.clone(),
            source,
        })?;
        info!(%local_addr, "listening");

        let queue = Arc::new(ConnectionQueue::new(config.queue_capacity));
        let metrics = MetricsCollector::new();
        let pool = WorkerPool::spawn(config.workers, &queue, &config.serve_dir, &metrics)?;

        transition(&mut state, ServerState::Serving);

        Ok(Self {
            listener,
            local_addr,
            queue,
            pool,
            metrics,
            shutdown: ShutdownHandle::new(local_addr),
            state,
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn worker_count(&self) -> usize {
        self.pool.size()
    }

    /// Handle para pedir el apagado desde otro thread (o un handler de señal)
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Fases `Serving` → `Draining` → `Stopped`
    ///
    /// Bloquea hasta que se dispare el shutdown o falle `accept`.
    pub fn run(self) -> Result<ServerReport, ServerError> {
        let Server {
            listener,
            local_addr: _,
            queue,
            pool,
            metrics,
            shutdown,
            state: _,
        } = self;

        let mut failure: Option<ServerError> = None;
        let mut accepted = 0u64;

        // === Serving ===
        while !shutdown.is_triggered() {
            let stream = match listener.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, "connection accepted");
                    stream
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    record_failure(&mut failure, ServerError::Accept(e));
                    break;
                }
            };

            // La conexión de despertar (o una que llegó tarde) no se encola
            if shutdown.is_triggered() {
                drop(stream);
                break;
            }

            if let Err(e) = queue.enqueue(stream) {
                record_failure(&mut failure, e.into());
                break;
            }
            accepted += 1;
        }

        drain_and_stop(queue, pool, &metrics, accepted, failure, listener)
    }
}

/// Fases `Draining` → `Stopped`
///
/// Corre completa aunque ya haya un error registrado; se retorna el primero.
fn drain_and_stop<C>(
    queue: Arc<ConnectionQueue<C>>,
    pool: WorkerPool,
    metrics: &MetricsCollector,
    accepted: u64,
    mut failure: Option<ServerError>,
    listener: TcpListener,
) -> Result<ServerReport, ServerError> {
    let mut state = ServerState::Serving;

    // === Draining ===
    transition(&mut state, ServerState::Draining);
    let pending = queue.len();
    if pending > 0 {
        info!(pending, "draining queued connections");
    }

    if let Err(e) = queue.shutdown() {
        record_failure(&mut failure, e.into());
    }

    let handled = match pool.join() {
        Ok(handled) => handled,
        Err(e) => {
            record_failure(&mut failure, e);
            0
        }
    };

    // === Stopped ===
    let discarded = match ConnectionQueue::destroy(queue) {
        Ok(discarded) => discarded,
        Err(e) => {
            record_failure(&mut failure, e.into());
            0
        }
    };
    if discarded > 0 {
        warn!(discarded, "connections left in queue were closed unanswered");
    }
    drop(listener);
    transition(&mut state, ServerState::Stopped);

    let snapshot = metrics.snapshot();
    match snapshot.to_json() {
        Ok(json) => info!(accepted, handled, metrics = %json, "server stopped"),
        Err(e) => warn!(error = %e, "failed to serialize metrics"),
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(ServerReport {
            accepted,
            handled,
            discarded,
            metrics: snapshot,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            serve_dir: dir.path().to_path_buf(),
            port: 0,
            host: "127.0.0.1".to_string(),
            workers: 2,
            queue_capacity: 8,
            log_filter: "info".to_string(),
        }
    }

    fn get(addr: SocketAddr, path: &str) -> Vec<u8> {
        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client
            .write_all(format!("GET {} HTTP/1.0\r\n\r\n", path).as_bytes())
            .unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_bind_starts_in_serving_state() {
        let dir = TempDir::new().unwrap();
        let server = Server::bind(&test_config(&dir)).unwrap();

        assert_eq!(server.state(), ServerState::Serving);
        assert_eq!(server.worker_count(), 2);
        assert_ne!(server.local_addr().port(), 0);

        let handle = server.shutdown_handle();
        let runner = thread::spawn(move || server.run());
        handle.trigger();

        let report = runner.join().unwrap().unwrap();
        assert_eq!(report.accepted, 0);
        assert_eq!(report.discarded, 0);
    }

    #[test]
    fn test_bind_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.workers = 0;

        assert!(matches!(Server::bind(&config), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_bind_port_in_use() {
        let dir = TempDir::new().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = test_config(&dir);
        config.port = taken.local_addr().unwrap().port();

        assert!(matches!(Server::bind(&config), Err(ServerError::Bind { .. })));
    }

    #[test]
    fn test_serves_then_drains() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("gatsby.txt"), "old sport").unwrap();

        let server = Server::bind(&test_config(&dir)).unwrap();
        let addr = server.local_addr();
        let handle = server.shutdown_handle();
        let runner = thread::spawn(move || server.run());

        let ok = get(addr, "/gatsby.txt");
        assert_eq!(
            ok,
            b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 9\r\n\r\nold sport"
        );

        let missing = get(addr, "/missing.txt");
        assert_eq!(missing, b"HTTP/1.0 404 Not Found\r\nContent-Length: 0\r\n\r\n");

        handle.trigger();
        let report = runner.join().unwrap().unwrap();

        assert_eq!(report.accepted, 2);
        assert_eq!(report.handled, 2);
        assert_eq!(report.metrics.total_responses, 2);
    }

    /// Conexión en memoria; `Panics` hace caer al worker que la lee
    enum FakeConn {
        Request(Cursor<Vec<u8>>),
        Panics,
    }

    impl Read for FakeConn {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self {
                FakeConn::Request(input) => input.read(buf),
                FakeConn::Panics => panic!("connection handler crashed"),
            }
        }
    }

    impl Write for FakeConn {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn fake_request() -> FakeConn {
        FakeConn::Request(Cursor::new(b"GET /gatsby.txt HTTP/1.0\r\n\r\n".to_vec()))
    }

    fn served_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("gatsby.txt"), "old sport").unwrap();
        dir
    }

    #[test]
    fn test_accept_failure_still_drains() {
        let dir = served_dir();
        let queue = Arc::new(ConnectionQueue::new(8));
        let metrics = MetricsCollector::new();
        let pool = WorkerPool::spawn(2, &queue, dir.path(), &metrics).unwrap();

        for _ in 0..3 {
            queue.enqueue(fake_request()).unwrap();
        }

        let failure = Some(ServerError::Accept(std::io::Error::from(
            ErrorKind::ConnectionAborted,
        )));
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();

        let result = drain_and_stop(queue, pool, &metrics, 3, failure, listener);

        assert!(matches!(result, Err(ServerError::Accept(_))));
        assert_eq!(metrics.snapshot().count(crate::http::StatusCode::Ok), 3);
    }

    #[test]
    fn test_worker_panic_fails_run_after_drain() {
        let dir = served_dir();
        let queue = Arc::new(ConnectionQueue::new(8));
        let metrics = MetricsCollector::new();
        let pool = WorkerPool::spawn(2, &queue, dir.path(), &metrics).unwrap();

        queue.enqueue(FakeConn::Panics).unwrap();
        for _ in 0..4 {
            queue.enqueue(fake_request()).unwrap();
        }
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();

        let result = drain_and_stop(queue, pool, &metrics, 5, None, listener);

        assert!(matches!(result, Err(ServerError::WorkerPanicked { .. })));
        // El otro worker atendió todo lo que quedaba en la cola
        assert_eq!(metrics.snapshot().count(crate::http::StatusCode::Ok), 4);
    }
}
