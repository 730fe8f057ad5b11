//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Los workers registran aquí el resultado de cada conexión; el
//! dispatcher toma un snapshot al terminar y lo reporta como JSON.

use crate::http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Máximo de latencias a guardar (para calcular percentiles)
const MAX_LATENCIES: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Respuestas enviadas completas
    total_responses: u64,

    /// Respuestas por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Requests vacíos o malformados (conexión cerrada sin respuesta)
    rejected: u64,

    /// Fallos de I/O a mitad de una conexión
    io_failures: u64,

    /// Bytes de body enviados
    body_bytes: u64,

    /// Últimas latencias registradas (en microsegundos)
    latencies: Vec<u64>,
}

/// Snapshot de métricas (para reportar al terminar)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub total_responses: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub rejected: u64,
    pub io_failures: u64,
    pub body_bytes: u64,
    pub latency_avg_us: u64,
    pub latency_p50_us: u64,
    pub latency_p99_us: u64,
    pub latency_max_us: u64,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData::default())),
            start_time: Instant::now(),
        }
    }

    // Son solo contadores: si un worker hizo panic con el lock tomado, se sigue igual
    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registra una respuesta enviada completa
    pub fn record_response(&self, status: StatusCode, body_bytes: u64, latency: Duration) {
        let mut data = self.data();

        data.total_responses += 1;
        *data.status_codes.entry(status.as_u16()).or_insert(0) += 1;
        data.body_bytes += body_bytes;

        if data.latencies.len() >= MAX_LATENCIES {
            data.latencies.remove(0);
        }
        data.latencies.push(latency.as_micros() as u64);
    }

    /// Registra un request vacío o malformado
    pub fn record_rejected(&self) {
        self.data().rejected += 1;
    }

    /// Registra un fallo de I/O sobre una conexión
    pub fn record_io_failure(&self) {
        self.data().io_failures += 1;
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();

        let mut sorted = data.latencies.clone();
        sorted.sort_unstable();
        let percentile = |p: usize| -> u64 {
            if sorted.is_empty() {
                0
            } else {
                sorted[(sorted.len() * p / 100).min(sorted.len() - 1)]
            }
        };
        let avg = if sorted.is_empty() {
            0
        } else {
            sorted.iter().sum::<u64>() / sorted.len() as u64
        };

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_responses: data.total_responses,
            status_codes: data.status_codes.clone(),
            rejected: data.rejected,
            io_failures: data.io_failures,
            body_bytes: data.body_bytes,
            latency_avg_us: avg,
            latency_p50_us: percentile(50),
            latency_p99_us: percentile(99),
            latency_max_us: sorted.last().copied().unwrap_or(0),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSnapshot {
    /// Respuestas enviadas con un código dado
    pub fn count(&self, status: StatusCode) -> u64 {
        self.status_codes.get(&status.as_u16()).copied().unwrap_or(0)
    }

    /// Serializa el snapshot a JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
