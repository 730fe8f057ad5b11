//! # Cola Acotada Thread-Safe
//! src/queue/connection.rs
//!
//! Implementa la disciplina clásica de bounded buffer con un mutex y dos
//! condvars. Las operaciones normales despiertan a UN solo waiter
//! (`notify_one`); `shutdown` despierta a todos (`notify_all`) en ambas
//! condvars para que ningún thread quede esperando para siempre.
//!
//! ## Contrato de shutdown
//!
//! - `dequeue` sigue entregando lo que ya estaba encolado (en orden FIFO)
//!   y solo devuelve [`Dequeued::Shutdown`] cuando la cola queda vacía.
//! - `enqueue` después del shutdown descarta (y por lo tanto cierra) el
//!   elemento recibido y retorna `Ok(())`.

use crate::error::QueueError;
use crate::queue::ring::RingBuffer;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Capacidad por defecto de la cola
pub const DEFAULT_CAPACITY: usize = 512;

/// Resultado de un `dequeue`
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued<T> {
    /// Una conexión, ahora propiedad exclusiva de quien la sacó
    Item(T),

    /// Sentinel: la cola fue cerrada y ya no queda nada pendiente
    Shutdown,
}

/// Estado protegido por el mutex
struct QueueState<T> {
    ring: RingBuffer<T>,

    /// Una vez en `true` nunca vuelve a `false`
    shutdown: bool,
}

/// Cola acotada de conexiones pendientes
pub struct ConnectionQueue<T> {
    state: Mutex<QueueState<T>>,

    /// Señalada cuando entra un elemento
    not_empty: Condvar,

    /// Señalada cuando se libera un slot
    not_full: Condvar,
}

impl<T> ConnectionQueue<T> {
    /// Crea una cola vacía con capacidad fija
    ///
    /// # Panics
    ///
    /// Si `capacity == 0` (la configuración ya lo valida antes)
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be > 0");

        Self {
            state: Mutex::new(QueueState {
                ring: RingBuffer::with_capacity(capacity),
                shutdown: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueState<T>>, QueueError> {
        self.state.lock().map_err(|_| QueueError::Poisoned)
    }

    /// Encola un elemento
    ///
    /// Bloquea mientras la cola está llena. Si la cola está (o queda)
    /// cerrada, el elemento se descarta y retorna `Ok(())`: el shutdown
    /// no es un error, solo indica que hay que dejar de producir.
    pub fn enqueue(&self, item: T) -> Result<(), QueueError> {
        let mut state = self.lock()?;
        let mut item = item;

        loop {
            if state.shutdown {
                debug!("enqueue after shutdown, dropping connection");
                return Ok(());
            }

            match state.ring.push(item) {
                Ok(()) => {
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Err(rejected) => {
                    // Llena: esperar un slot libre (suelta el lock mientras espera)
                    item = rejected;
                    state = self
                        .not_full
                        .wait(state)
                        .map_err(|_| QueueError::Poisoned)?;
                }
            }
        }
    }

    /// Desencola el elemento más antiguo
    ///
    /// Bloquea mientras la cola está vacía y abierta.
    pub fn dequeue(&self) -> Result<Dequeued<T>, QueueError> {
        let mut state = self.lock()?;

        loop {
            if let Some(item) = state.ring.pop() {
                self.not_full.notify_one();
                return Ok(Dequeued::Item(item));
            }

            if state.shutdown {
                return Ok(Dequeued::Shutdown);
            }

            state = self
                .not_empty
                .wait(state)
                .map_err(|_| QueueError::Poisoned)?;
        }
    }

    /// Cierra la cola y despierta a todos los productores y consumidores
    ///
    /// Aunque el mutex esté envenenado, el flag se marca y se hace el
    /// broadcast igual; el error se reporta después.
    pub fn shutdown(&self) -> Result<(), QueueError> {
        let poisoned = match self.state.lock() {
            Ok(mut state) => {
                state.shutdown = true;
                false
            }
            Err(poison) => {
                poison.into_inner().shutdown = true;
                true
            }
        };

        self.not_empty.notify_all();
        self.not_full.notify_all();

        if poisoned {
            Err(QueueError::Poisoned)
        } else {
            Ok(())
        }
    }

    /// Libera la cola
    ///
    /// Solo puede llamarse cuando todos los workers terminaron, es decir,
    /// cuando el caller es el único owner del `Arc`. Los elementos que
    /// hayan quedado adentro se descartan (cerrándolos); retorna cuántos.
    pub fn destroy(queue: Arc<Self>) -> Result<usize, QueueError> {
        let queue = Arc::try_unwrap(queue).map_err(|shared| QueueError::InUse {
            owners: Arc::strong_count(&shared),
        })?;

        let mut state = queue
            .state
            .into_inner()
            .map_err(|_| QueueError::Poisoned)?;

        let mut discarded = 0;
        while state.ring.pop().is_some() {
            discarded += 1;
        }

        Ok(discarded)
    }

    /// Elementos pendientes
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ring
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ring
            .capacity()
    }

    pub fn is_shutdown(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shutdown
    }
}
