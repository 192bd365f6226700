//! Event Fan-out (C8): the two host callbacks set at init. Held by the
//! `IuAdaptor` value, not a process-wide global.

use crate::ue_table::UeCtx;
use async_trait::async_trait;
use ranap::{RabSetupOrModifiedItem, RaId, Sai};

#[derive(Debug, Clone)]
pub enum UeEventKind {
    LinkInvalidated,
    SecurityModeComplete,
    IuRelease,
    /// One decoded RAB setup/modified item. The connection-oriented
    /// dispatcher emits one of these per entry of SetupOrModifiedList,
    /// never just the first.
    RabAssign(RabSetupOrModifiedItem),
}

/// Host callbacks. Payloads are borrowed: the implementation must copy
/// anything it needs to retain before returning.
#[async_trait]
pub trait IuEvents: Send + Sync {
    /// Upward NAS delivery. `ra_id`/`sai` are present only for InitialUE and
    /// for DirectTransfer messages whose presence mask set them.
    async fn nas_receive(&self, ue: &UeCtx, nas_pdu: &[u8], ra_id: Option<RaId>, sai: Option<Sai>);

    async fn ue_event(&self, ue: &UeCtx, kind: UeEventKind);
}
