//! Upper-Layer Façade (C7): the operations exposed to the host core (MSC/SGSN).
//!
//! `IuAdaptor` is the single constructed value the host holds - no
//! process-wide globals. One instance owns the UE table, RNC registry, the
//! RANAP codec, the SCCP-User service, and the host's event sink.

use crate::error::IuError;
use crate::events::{IuEvents, UeEventKind};
use crate::rnc_registry::RncRegistry;
use crate::ue_table::{UeCtx, UeTable};
use common::ShutdownHandle;
use ranap::{KeyStatus, RanapCodec};
use slog::{error, info, Logger};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use stop_token::future::FutureExt;
use stop_token::StopSource;
use sua::{LinkId, SccpUserService, SctpSuaService, TransportEvent};

/// Where the SUA server listens. Parsing this from a config file, CLI
/// flags, or environment is the host's job - the core has no files, CLI,
/// or environment variables of its own.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub listen_addr: IpAddr,
    pub listen_port: u16,
}

/// Carries the two pieces of information `activate_RAB_PS` needs out of a
/// PDP context that only the host (SGSN GTP/PDP layer) owns.
pub trait PdpContextHandle: Send + Sync {
    fn ue(&self) -> &UeCtx;
    fn ggsn_user_plane_ipv4(&self) -> Ipv4Addr;
    fn teid(&self) -> u32;
}

pub struct IuAdaptor {
    pub(crate) ue_table: UeTable,
    pub(crate) rnc_registry: RncRegistry,
    pub(crate) codec: Arc<dyn RanapCodec>,
    pub(crate) sccp: Arc<dyn SccpUserService>,
    pub(crate) events: Arc<dyn IuEvents>,
    pub(crate) logger: Logger,
}

impl IuAdaptor {
    fn new(
        codec: Arc<dyn RanapCodec>,
        sccp: Arc<dyn SccpUserService>,
        events: Arc<dyn IuEvents>,
        logger: Logger,
    ) -> Arc<IuAdaptor> {
        Arc::new(IuAdaptor {
            ue_table: UeTable::new(),
            rnc_registry: RncRegistry::new(),
            codec,
            sccp,
            events,
            logger,
        })
    }

    /// Bind the SUA server and start routing its primitives. Returns the
    /// constructed adaptor plus a handle the host uses to shut the listener
    /// down.
    pub async fn init(
        config: Config,
        codec: Arc<dyn RanapCodec>,
        events: Arc<dyn IuEvents>,
        logger: Logger,
    ) -> anyhow::Result<(Arc<IuAdaptor>, ShutdownHandle, SocketAddr)> {
        let addr = SocketAddr::new(config.listen_addr, config.listen_port);
        let (sccp, rx) = SctpSuaService::listen(addr, logger.clone())?;
        let bound_addr = sccp.bound_addr();
        let adaptor = IuAdaptor::new(codec, Arc::new(sccp), events, logger.clone());

        let stop_source = StopSource::new();
        let stop_token = stop_source.token();
        let loop_adaptor = adaptor.clone();
        let loop_logger = logger;
        let handle = async_std::task::spawn(async move {
            loop {
                match rx.recv().timeout_at(stop_token.clone()).await {
                    Ok(Ok(event)) => loop_adaptor.handle_transport_event(event).await,
                    Ok(Err(_closed)) => break,
                    Err(_timed_out) => break, // stop requested
                }
            }
            info!(loop_logger, "Iu transport event loop stopped");
        });

        Ok((adaptor, ShutdownHandle::new(handle, stop_source), bound_addr))
    }

    async fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Primitive(prim) => self.handle_primitive(prim).await,
            TransportEvent::LinkInvalidated(link) => self.link_invalidate(link).await,
        }
    }

    /// Send a NAS PDU down an established dialogue as RANAP Direct-Transfer.
    pub async fn send_nas(&self, ue: &UeCtx, sapi: u8, payload: &[u8]) -> Result<(), IuError> {
        let bytes = self.codec.encode_direct_transfer(sapi, payload);
        self.send_data_encoded(ue, bytes).await
    }

    /// Activate a CS voice RAB.
    pub async fn activate_rab_cs(
        &self,
        ue: &UeCtx,
        rab_id: u8,
        rtp_ipv4: Ipv4Addr,
        rtp_port: u16,
    ) -> Result<(), IuError> {
        let bytes = self.codec.encode_rab_assignment_cs(rab_id, rtp_ipv4, rtp_port);
        self.send_data_encoded(ue, bytes).await
    }

    /// Activate a PS data RAB. `pdp` supplies the GGSN user-plane address and
    /// TEID; the dialogue is resolved from the PDP context's owning UE.
    pub async fn activate_rab_ps(
        &self,
        rab_id: u8,
        pdp: &dyn PdpContextHandle,
    ) -> Result<(), IuError> {
        let bytes = self
            .codec
            .encode_rab_assignment_ps(rab_id, pdp.ggsn_user_plane_ipv4(), pdp.teid());
        self.send_data_encoded(pdp.ue(), bytes).await
    }

    /// Deactivate a RAB: encode and send Iu-RAB-Deactivate. No RAB
    /// bookkeeping table exists in the data model, so this is
    /// fire-and-forget at the same ownership level as `send_nas`.
    pub async fn deactivate_rab(&self, ue: &UeCtx, rab_id: u8) -> Result<(), IuError> {
        let bytes = self.codec.encode_iu_rab_deactivate(rab_id);
        self.send_data_encoded(ue, bytes).await
    }

    /// Derive IK (always) and CK (if `send_ck`) from `kc` and emit
    /// Security-Mode-Command.
    pub async fn send_security_mode(
        &self,
        ue: &UeCtx,
        kc: [u8; 8],
        send_ck: bool,
        new_key: bool,
    ) -> Result<(), IuError> {
        let ik = crate::keys::derive_ik(kc);
        let ck = send_ck.then(|| crate::keys::derive_ck(kc));
        let key_status = if new_key { KeyStatus::New } else { KeyStatus::Old };
        let bytes = self.codec.encode_security_mode_command(ik, ck, key_status);
        self.send_data_encoded(ue, bytes).await
    }

    pub async fn page_cs(&self, imsi: &str, tmsi: Option<u32>, lac: u16) -> usize {
        self.page(imsi, tmsi, lac, None).await
    }

    pub async fn page_ps(&self, imsi: &str, ptmsi: Option<u32>, lac: u16, rac: u8) -> usize {
        self.page(imsi, ptmsi, lac, Some(rac)).await
    }

    /// Purge RNC records for `link`, then notify every UE context that was
    /// created on it. Called by the transport when an SUA association dies
    /// - the core's only cancellation path.
    pub async fn link_invalidate(&self, link: LinkId) {
        self.rnc_registry.invalidate_link(link).await;
        for ue in self.ue_table.iter_by_link(link).await {
            ue.clear_link();
            self.events.ue_event(&ue, UeEventKind::LinkInvalidated).await;
        }
    }

    /// The explicit teardown contract: after observing an IU-RELEASE event
    /// (or an N-DISCONNECT indication), the host must call this to actually
    /// tear the dialogue's table entry down.
    pub async fn release_dialogue(&self, ue: &UeCtx) {
        self.ue_table.remove(ue).await;
    }

    /// Every RNC currently known to the registry. Host/test introspection -
    /// the adaptation layer itself never needs to enumerate this.
    pub async fn rnc_registry_snapshot(&self) -> Vec<crate::rnc_registry::RncRecord> {
        self.rnc_registry.iter().await
    }

    pub(crate) async fn send_data_encoded(&self, ue: &UeCtx, bytes: Vec<u8>) -> Result<(), IuError> {
        let link = ue.current_link().ok_or_else(|| {
            IuError::Routing(format!(
                "dialogue {:?} has no live link, dropping send",
                ue.conn_id()
            ))
        })?;
        self.sccp
            .send_data(link, ue.conn_id(), bytes)
            .await
            .map_err(IuError::from)
    }

    pub(crate) fn log_handler_error(&self, context: &str, err: &IuError) {
        error!(self.logger, "{context}: {err}");
    }
}
