//! # Pool de Workers
//! src/pool/mod.rs
//!
//! N workers fijos, todos consumiendo de la misma [`ConnectionQueue`].
//!
//! ```text
//! queue ──▶ worker-0 ─┐
//!       ──▶ worker-1 ─┼─▶ read_request → resolve → write_response → close
//!       ──▶ worker-N ─┘
//! ```

pub mod handler;
pub mod worker;

pub use handler::handle_connection;
pub use worker::Worker;

use crate::error::ServerError;
use crate::metrics::MetricsCollector;
use crate::queue::ConnectionQueue;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Conjunto de workers lanzados al arrancar el servidor
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Lanza `size` workers sobre la cola
    ///
    /// Si algún thread no se puede crear, cierra la cola, espera a los que
    /// ya arrancaron y retorna el error.
    pub fn spawn<C>(
        size: usize,
        queue: &Arc<ConnectionQueue<C>>,
        served_dir: &Path,
        metrics: &MetricsCollector,
    ) -> Result<Self, ServerError>
    where
        C: Read + Write + Send + 'static,
    {
        let served_dir: Arc<Path> = Arc::from(served_dir);
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            match Worker::spawn(id, Arc::clone(queue), Arc::clone(&served_dir), metrics.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    error!(worker = id, error = %e, "failed to spawn worker");
                    if let Err(queue_err) = queue.shutdown() {
                        error!(error = %queue_err, "queue shutdown failed");
                    }
                    let _ = Self { workers }.join();
                    return Err(ServerError::Spawn(e));
                }
            }
        }

        info!(workers = size, "worker pool started");
        Ok(Self { workers })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Espera a que todos los workers terminen
    ///
    /// Retorna el total de conexiones atendidas, o el primer error
    /// (worker con panic o con la cola corrupta). Siempre espera a todos.
    pub fn join(self) -> Result<usize, ServerError> {
        let mut handled = 0;
        let mut first_error = None;

        for worker in self.workers {
            let id = worker.id();
            let failure = match worker.join() {
                Ok(Ok(count)) => {
                    handled += count;
                    continue;
                }
                Ok(Err(source)) => ServerError::Worker { id, source },
                Err(_) => ServerError::WorkerPanicked { id },
            };

            error!(error = %failure, "worker failed");
            if first_error.is_none() {
                first_error = Some(failure);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(handled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Conexión de solo lectura; lo escrito se descarta
    struct Sink(Cursor<Vec<u8>>);

    impl Read for Sink {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            // Un request vacío simula un handler que se cae
            if self.0.get_ref().is_empty() {
                panic!("connection handler crashed");
            }
            self.0.read(buf)
        }
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pool_drains_queue_and_joins() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("x.txt"), "x").unwrap();

        let queue = Arc::new(ConnectionQueue::new(16));
        let metrics = MetricsCollector::new();
        let pool = WorkerPool::spawn(3, &queue, dir.path(), &metrics).unwrap();
        assert_eq!(pool.size(), 3);

        for _ in 0..40 {
            queue
                .enqueue(Sink(Cursor::new(b"GET /x.txt HTTP/1.0\r\n\r\n".to_vec())))
                .unwrap();
        }
        queue.shutdown().unwrap();

        assert_eq!(pool.join().unwrap(), 40);
        assert_eq!(metrics.snapshot().count(crate::http::StatusCode::Ok), 40);
        assert_eq!(ConnectionQueue::destroy(queue), Ok(0));
    }

    #[test]
    fn test_pool_join_idle_workers() {
        let dir = TempDir::new().unwrap();
        let queue: Arc<ConnectionQueue<Sink>> = Arc::new(ConnectionQueue::new(4));
        let pool = WorkerPool::spawn(5, &queue, dir.path(), &MetricsCollector::new()).unwrap();

        queue.shutdown().unwrap();
        assert_eq!(pool.join().unwrap(), 0);
    }

    #[test]
    fn test_pool_join_reports_panicked_worker() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("x.txt"), "x").unwrap();

        let queue = Arc::new(ConnectionQueue::new(16));
        let metrics = MetricsCollector::new();
        let pool = WorkerPool::spawn(2, &queue, dir.path(), &metrics).unwrap();

        queue.enqueue(Sink(Cursor::new(Vec::new()))).unwrap();
        for _ in 0..10 {
            queue
                .enqueue(Sink(Cursor::new(b"GET /x.txt HTTP/1.0\r\n\r\n".to_vec())))
                .unwrap();
        }
        queue.shutdown().unwrap();

        assert!(matches!(pool.join(), Err(ServerError::WorkerPanicked { .. })));
        // El worker sobreviviente drenó el resto
        assert_eq!(metrics.snapshot().count(crate::http::StatusCode::Ok), 10);
        assert_eq!(ConnectionQueue::destroy(queue), Ok(0));
    }
}
