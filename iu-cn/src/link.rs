//! Link Primitive Adaptor (C1): translates upward SCCP-User primitives into
//! table lookups plus calls into the connection-oriented/connection-less
//! dispatchers.

use crate::error::IuError;
use crate::facade::IuAdaptor;
use crate::events::UeEventKind;
use ranap::{InitiatingMessage, RanapPdu, SuccessfulOutcomeMessage};
use slog::{debug, warn};
use sua::SccpPrimitive;

impl IuAdaptor {
    pub(crate) async fn handle_primitive(&self, prim: SccpPrimitive) {
        match prim {
            SccpPrimitive::NConnectIndication { link, conn_id, payload } => {
                self.on_connect_indication(link, conn_id, payload).await
            }
            SccpPrimitive::NDataIndication { link, conn_id, payload } => {
                self.on_data_indication(link, conn_id, payload).await
            }
            SccpPrimitive::NDisconnectIndication { link, conn_id, payload } => {
                self.on_disconnect_indication(link, conn_id, payload).await
            }
            SccpPrimitive::NUnitDataIndication { link, payload } => {
                self.on_unitdata_indication(link, payload).await
            }
        }
    }

    /// A new dialogue. Always accepted at the SCCP level (RANAP decides
    /// whether the InitialUE content makes sense); the table entry is
    /// created unconditionally so a malformed first PDU can still be traced
    /// back to its link/conn_id in logs.
    async fn on_connect_indication(
        &self,
        link: sua::LinkId,
        conn_id: sua::ConnId,
        payload: Vec<u8>,
    ) {
        let ue = self.ue_table.allocate(link, conn_id).await;
        if let Err(e) = self.sccp.respond_connect(link, conn_id).await {
            warn!(self.logger, "N-CONNECT.response failed: {e}"; "conn_id" => conn_id.0);
            return;
        }

        match self.codec.decode(&payload) {
            Ok(RanapPdu::Initiating(InitiatingMessage::InitialUe(ie))) => {
                let rac = if ie.ra_id.rac != 0 { Some(ie.ra_id.rac) } else { None };
                self.rnc_registry
                    .register(ie.global_rnc_id.rnc_id, ie.ra_id.lac, rac, link, &self.logger)
                    .await;
                self.events
                    .nas_receive(&ue, &ie.nas_pdu, Some(ie.ra_id), Some(ie.sai))
                    .await;
            }
            Ok(other) => {
                debug!(self.logger, "unexpected PDU opening a dialogue: {other:?}");
            }
            Err(e) => {
                self.log_handler_error("decoding InitialUE", &IuError::from(e));
            }
        }
    }

    async fn on_data_indication(&self, link: sua::LinkId, conn_id: sua::ConnId, payload: Vec<u8>) {
        let Some(ue) = self.ue_table.find(link, conn_id).await else {
            warn!(self.logger, "N-DATA.indication for unknown dialogue"; "conn_id" => conn_id.0);
            return;
        };
        match self.codec.decode(&payload) {
            Ok(pdu) => self.dispatch_co(&ue, pdu).await,
            Err(e) => self.log_handler_error("decoding co PDU", &IuError::from(e)),
        }
    }

    /// Dialogue teardown. This only clears the link and raises `IuRelease` -
    /// actual removal from the table is the host's job via
    /// `release_dialogue`.
    async fn on_disconnect_indication(
        &self,
        link: sua::LinkId,
        conn_id: sua::ConnId,
        payload: Option<Vec<u8>>,
    ) {
        let Some(ue) = self.ue_table.find(link, conn_id).await else {
            return;
        };
        if let Some(bytes) = payload {
            match self.codec.decode(&bytes) {
                Ok(RanapPdu::SuccessfulOutcome(SuccessfulOutcomeMessage::IuReleaseComplete)) => {}
                Ok(other) => debug!(self.logger, "disconnect carried unexpected PDU: {other:?}"),
                Err(e) => self.log_handler_error("decoding disconnect payload", &IuError::from(e)),
            }
        }
        ue.clear_link();
        self.events.ue_event(&ue, UeEventKind::IuRelease).await;
    }

    async fn on_unitdata_indication(&self, link: sua::LinkId, payload: Vec<u8>) {
        match self.codec.decode(&payload) {
            Ok(pdu) => self.dispatch_cl(link, pdu).await,
            Err(e) => self.log_handler_error("decoding cl PDU", &IuError::from(e)),
        }
    }
}
