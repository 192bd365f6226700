//! The four error kinds surfaced at the façade boundary: decode, routing,
//! transport, host. Internally, individual handlers just log and return;
//! nothing here is fatal to the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IuError {
    #[error("decode error: {0}")]
    Decode(#[from] ranap::DecodeError),

    #[error("routing error: {0}")]
    Routing(String),

    #[error("transport error: {0}")]
    Transport(#[from] sua::SendError),

    #[error("host callback error: {0}")]
    Host(String),
}
