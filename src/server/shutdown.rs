//! # Señal de Apagado
//! src/server/shutdown.rs
//!
//! Token de cancelación compartido entre el dispatcher y quien dispare el
//! apagado (el handler de SIGINT, o un test).
//!
//! `accept` es bloqueante y std reintenta solo ante EINTR, así que marcar
//! el flag no alcanza: `trigger` además abre una conexión descartable al
//! propio listener para que `accept` retorne y el dispatcher vea el flag.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Tiempo máximo para la conexión de despertar
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

struct ShutdownState {
    triggered: AtomicBool,

    /// Dirección a la que conectarse para desbloquear `accept`
    wake_addr: SocketAddr,
}

/// Handle clonable para pedir el apagado del servidor
#[derive(Clone)]
pub struct ShutdownHandle {
    state: Arc<ShutdownState>,
}

impl ShutdownHandle {
    /// Crea el handle para un listener escuchando en `listen_addr`
    ///
    /// Si el listener está en una dirección comodín (`0.0.0.0` / `::`),
    /// el despertar va por loopback.
    pub fn new(listen_addr: SocketAddr) -> Self {
        let mut wake_addr = listen_addr;
        if wake_addr.ip().is_unspecified() {
            let loopback = match wake_addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            wake_addr.set_ip(loopback);
        }

        Self {
            state: Arc::new(ShutdownState {
                triggered: AtomicBool::new(false),
                wake_addr,
            }),
        }
    }

    /// Pide el apagado. Llamarlo más de una vez no tiene efecto extra.
    pub fn trigger(&self) {
        if self.state.triggered.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("shutdown requested");
        if let Err(e) = TcpStream::connect_timeout(&self.state.wake_addr, WAKE_TIMEOUT) {
            // El listener puede estar ya cerrado; el flag alcanza en ese caso
            debug!(error = %e, "wake-up connection failed");
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.state.triggered.load(Ordering::SeqCst)
    }

    pub fn wake_addr(&self) -> SocketAddr {
        self.state.wake_addr
    }
}

/// Instala el handler de Ctrl+C (SIGINT)
///
/// Los workers y el dispatcher son threads nativos; la señal se escucha
/// con un runtime tokio de un solo thread dedicado a eso. Al llegar la
/// señal se dispara `handle`.
///
/// En unix el handler queda registrado antes de retornar: un SIGINT que
/// llegue justo después ya no termina el proceso.
pub fn spawn_signal_listener(handle: ShutdownHandle) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    #[cfg(unix)]
    let mut interrupt = {
        let _guard = runtime.enter();
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?
    };

    thread::Builder::new()
        .name("signal".to_string())
        .spawn(move || {
            runtime.block_on(async {
                #[cfg(unix)]
                let received = interrupt.recv().await.ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "signal stream closed")
                });
                #[cfg(not(unix))]
                let received = tokio::signal::ctrl_c().await;

                match received {
                    Ok(()) => {
                        info!("SIGINT received");
                        handle.trigger();
                    }
                    Err(e) => error!(error = %e, "failed to listen for SIGINT"),
                }
            });
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_unspecified_maps_to_loopback() {
        let handle = ShutdownHandle::new("0.0.0.0:8080".parse().unwrap());
        assert_eq!(handle.wake_addr(), "127.0.0.1:8080".parse().unwrap());

        let handle = ShutdownHandle::new("[::]:9000".parse().unwrap());
        assert_eq!(handle.wake_addr(), "[::1]:9000".parse().unwrap());
    }

    #[test]
    fn test_specific_address_kept() {
        let handle = ShutdownHandle::new("127.0.0.1:3000".parse().unwrap());
        assert_eq!(handle.wake_addr(), "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn test_trigger_wakes_blocked_accept() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let handle = ShutdownHandle::new(listener.local_addr().unwrap());

        let acceptor = thread::spawn(move || listener.accept().is_ok());

        let trigger = handle.clone();
        trigger.trigger();

        assert!(acceptor.join().unwrap());
        assert!(handle.is_triggered());
    }

    #[test]
    fn test_trigger_twice_and_closed_listener() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let handle = ShutdownHandle::new(addr);

        // Sin listener: la conexión falla pero el flag queda marcado
        handle.trigger();
        handle.trigger();
        assert!(handle.is_triggered());
    }
}
