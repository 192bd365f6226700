//! Connection-Less RANAP Dispatcher (C5): handles N-UNITDATA.indication, the
//! only traffic carried outside an SCCP dialogue (Reset, and the CN's own
//! outbound Paging). Reset always gets a Reset-Acknowledge reply - a peer
//! running a graceful Reset procedure must not be left hanging.

use crate::facade::IuAdaptor;
use ranap::{InitiatingMessage, RanapPdu};
use slog::{debug, warn};
use sua::LinkId;

const RANAP_SSN: u8 = 142;

impl IuAdaptor {
    pub(crate) async fn dispatch_cl(&self, link: LinkId, pdu: RanapPdu) {
        match pdu {
            RanapPdu::Initiating(InitiatingMessage::Reset(reset)) => {
                self.handle_reset(link, reset.cause).await
            }
            RanapPdu::Initiating(InitiatingMessage::ErrorIndication(ei)) => {
                debug!(self.logger, "RANAP Error-Indication (connection-less)"; "cause" => ?ei.cause);
            }
            other => {
                debug!(self.logger, "unhandled connection-less PDU: {other:?}");
            }
        }
    }

    async fn handle_reset(&self, link: LinkId, cause: ranap::Cause) {
        debug!(self.logger, "RANAP Reset"; "cause" => ?cause);
        let bytes = self.codec.encode_reset_acknowledge();
        if let Err(e) = self
            .sccp
            .send_unitdata(link, bytes, RANAP_SSN, RANAP_SSN)
            .await
        {
            warn!(self.logger, "sending Reset-Acknowledge failed: {e}");
        }
    }
}
