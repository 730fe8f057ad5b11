//! # Cola de Conexiones
//! src/queue/mod.rs
//!
//! Cola acotada productor/consumidor entre el listener y los workers:
//!
//! ```text
//! Listener ──enqueue──▶ [ ring buffer (C slots) ] ──dequeue──▶ Worker 1..N
//! ```
//!
//! - `enqueue` bloquea mientras la cola está llena
//! - `dequeue` bloquea mientras la cola está vacía
//! - `shutdown` despierta a TODOS los que esperan (broadcast)

pub mod connection;
pub mod ring;

pub use connection::{ConnectionQueue, Dequeued, DEFAULT_CAPACITY};
pub use ring::RingBuffer;
