//! Connection-Oriented RANAP Dispatcher (C4): handles PDUs arriving on an
//! established dialogue (N-DATA.indication).
//!
//! `successfulOutcome` and `outcome` are separated at the type level by
//! `RanapPdu`, so one can never silently fall through into the other's
//! handler.

use crate::events::UeEventKind;
use crate::facade::IuAdaptor;
use crate::ue_table::UeCtx;
use ranap::{InitiatingMessage, OutcomeMessage, RanapPdu, SuccessfulOutcomeMessage};
use slog::debug;

impl IuAdaptor {
    pub(crate) async fn dispatch_co(&self, ue: &UeCtx, pdu: RanapPdu) {
        match pdu {
            RanapPdu::Initiating(InitiatingMessage::DirectTransfer(dt)) => {
                self.events
                    .nas_receive(ue, &dt.nas_pdu, dt.ra_id, dt.sai)
                    .await;
            }
            RanapPdu::Initiating(InitiatingMessage::ErrorIndication(ei)) => {
                debug!(self.logger, "RANAP Error-Indication"; "cause" => ?ei.cause);
            }
            RanapPdu::Initiating(InitiatingMessage::IuReleaseRequest(rel)) => {
                debug!(self.logger, "Iu-Release-Request"; "cause" => ?rel.cause);
                let bytes = self.codec.encode_iu_release_command(rel.cause);
                if let Err(e) = self.send_data_encoded(ue, bytes).await {
                    self.log_handler_error("sending Iu-Release-Command", &e);
                }
            }
            RanapPdu::SuccessfulOutcome(SuccessfulOutcomeMessage::SecurityModeComplete) => {
                self.events
                    .ue_event(ue, UeEventKind::SecurityModeComplete)
                    .await;
            }
            RanapPdu::SuccessfulOutcome(SuccessfulOutcomeMessage::IuReleaseComplete) => {
                ue.clear_link();
                self.events.ue_event(ue, UeEventKind::IuRelease).await;
            }
            RanapPdu::Outcome(OutcomeMessage::RabAssignmentResponse(resp)) => {
                // Every entry is a distinct RAB outcome the host needs, not
                // just the first.
                for item in resp.setup_or_modified_list.into_iter().flatten() {
                    self.events
                        .ue_event(ue, UeEventKind::RabAssign(item))
                        .await;
                }
            }
            other => {
                debug!(self.logger, "unhandled connection-oriented PDU: {other:?}");
            }
        }
    }
}
