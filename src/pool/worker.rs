//! # Worker
//! src/pool/worker.rs
//!
//! Thread de larga vida que saca conexiones de la cola hasta recibir el
//! sentinel de shutdown. Solo sale antes si la cola se corrompe (lock
//! envenenado).

use crate::error::QueueError;
use crate::metrics::MetricsCollector;
use crate::pool::handler::handle_connection;
use crate::queue::{ConnectionQueue, Dequeued};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Un worker del pool y su thread
pub struct Worker {
    id: usize,
    thread: JoinHandle<Result<usize, QueueError>>,
}

impl Worker {
    /// Lanza el thread del worker
    pub fn spawn<C>(
        id: usize,
        queue: Arc<ConnectionQueue<C>>,
        served_dir: Arc<Path>,
        metrics: MetricsCollector,
    ) -> std::io::Result<Self>
    where
        C: Read + Write + Send + 'static,
    {
        let thread = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || worker_loop(id, &queue, &served_dir, &metrics))?;

        Ok(Self { id, thread })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Espera a que el thread termine (`Err` si hizo panic)
    pub fn join(self) -> thread::Result<Result<usize, QueueError>> {
        self.thread.join()
    }
}

/// Loop principal del worker: dequeue → atender → cerrar
///
/// Retorna cuántas conexiones atendió.
fn worker_loop<C: Read + Write>(
    id: usize,
    queue: &ConnectionQueue<C>,
    served_dir: &Path,
    metrics: &MetricsCollector,
) -> Result<usize, QueueError> {
    info!(worker = id, "worker started");
    let mut handled = 0usize;

    loop {
        let conn = match queue.dequeue() {
            Ok(Dequeued::Item(conn)) => conn,
            Ok(Dequeued::Shutdown) => break,
            Err(e) => {
                error!(worker = id, error = %e, "dequeue failed, worker stopping");
                return Err(e);
            }
        };

        match handle_connection(conn, served_dir, metrics) {
            Ok(status) => debug!(worker = id, status = status.as_u16(), "connection served"),
            Err(e) => warn!(worker = id, error = %e, "connection aborted"),
        }
        handled += 1;
    }

    info!(worker = id, handled, "worker exiting");
    Ok(handled)
}
