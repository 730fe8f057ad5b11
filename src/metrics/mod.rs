//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Contadores del servidor, reportados al apagarse:
//! - Respuestas por código de estado
//! - Requests rechazados y fallos de I/O
//! - Latencias (promedio, p50, p99, máx.)

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
