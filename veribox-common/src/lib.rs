pub mod address;
pub mod logging;

pub use tracing;

/// Value broadcast to background tasks when the process is asked to stop.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Shutdown,
}
