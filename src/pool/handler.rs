//! # Manejo de una Conexión
//! src/pool/handler.rs
//!
//! Un ciclo completo leer → resolver → responder sobre una conexión ya
//! sacada de la cola. La conexión se recibe por valor y se cierra (drop)
//! al salir, en cualquier camino: éxito, request inválido o fallo de I/O.

use crate::error::RequestError;
use crate::http::{read_request, resolve, write_response, StatusCode};
use crate::metrics::MetricsCollector;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

fn serve<C: Read + Write>(conn: &mut C, served_dir: &Path) -> Result<(StatusCode, u64), RequestError> {
    let resource = read_request(conn)?;
    let outcome = resolve(&resource, served_dir)?;

    let (status, sent) = write_response(conn, &outcome)?;
    debug!(%resource, status = status.as_u16(), bytes = sent, "response sent");

    Ok((status, sent))
}

/// Atiende una conexión y la cierra
///
/// Retorna el código enviado, o el error que hizo abortar la conexión.
/// Los errores son locales a esta conexión: el worker sigue con la próxima.
pub fn handle_connection<C: Read + Write>(
    mut conn: C,
    served_dir: &Path,
    metrics: &MetricsCollector,
) -> Result<StatusCode, RequestError> {
    let start = Instant::now();
    let result = serve(&mut conn, served_dir);
    drop(conn);

    match &result {
        Ok((status, sent)) => metrics.record_response(*status, *sent, start.elapsed()),
        Err(RequestError::EmptyRequest) | Err(RequestError::MalformedRequest(_)) => {
            metrics.record_rejected()
        }
        Err(RequestError::Io(_)) => metrics.record_io_failure(),
    }

    result.map(|(status, _)| status)
}
