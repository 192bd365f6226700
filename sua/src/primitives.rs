//! SCCP-User service primitive types: the south-side interface the core
//! consumes. `LinkId` identifies a live SUA association; `ConnId`
//! identifies one SCCP connection (UE dialogue) multiplexed within it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Opaque handle to a live SUA association. Equality is identity: two
/// `LinkId`s compare equal only if they name the same association, never by
/// coincidence of remote address (an association that dies and a new one
/// from the same peer get different ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(u64);

static NEXT_LINK_ID: AtomicU64 = AtomicU64::new(1);

impl LinkId {
    pub fn new() -> Self {
        LinkId(NEXT_LINK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

/// SCCP connection id, assigned by the SCCP peer (RNC/HNB-GW) and unique
/// within a link - the core never allocates these itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(pub u32);

/// Upward primitives the transport delivers to the core.
#[derive(Debug, Clone)]
pub enum SccpPrimitive {
    /// A remote peer is opening a dialogue; `payload` carries the embedded
    /// RANAP message (typically InitialUE).
    NConnectIndication {
        link: LinkId,
        conn_id: ConnId,
        payload: Vec<u8>,
    },
    /// In-dialogue data.
    NDataIndication {
        link: LinkId,
        conn_id: ConnId,
        payload: Vec<u8>,
    },
    /// Dialogue teardown; `payload` is `None` when the peer sent no RANAP
    /// payload with the disconnect.
    NDisconnectIndication {
        link: LinkId,
        conn_id: ConnId,
        payload: Option<Vec<u8>>,
    },
    /// Connection-less data (paging, reset).
    NUnitDataIndication { link: LinkId, payload: Vec<u8> },
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("link {0:?} is not currently live")]
    LinkDown(LinkId),
    #[error("transport send failed: {0}")]
    Transport(#[from] anyhow::Error),
}

/// Downward operations the core uses to talk to the SCCP-User service.
/// Implemented by the transport (`sua::transport::SctpSuaService` or a test
/// double).
#[async_trait]
pub trait SccpUserService: Send + Sync {
    /// Accept an inbound N-CONNECT.indication: send N-CONNECT.response.
    async fn respond_connect(&self, link: LinkId, conn_id: ConnId) -> Result<(), SendError>;

    /// Send RANAP bytes on an established dialogue (N-DATA.request).
    async fn send_data(
        &self,
        link: LinkId,
        conn_id: ConnId,
        payload: Vec<u8>,
    ) -> Result<(), SendError>;

    /// Send connection-less RANAP bytes (N-UNITDATA.request), addressed by
    /// RANAP sub-system numbers.
    async fn send_unitdata(
        &self,
        link: LinkId,
        payload: Vec<u8>,
        calling_ssn: u8,
        called_ssn: u8,
    ) -> Result<(), SendError>;
}
