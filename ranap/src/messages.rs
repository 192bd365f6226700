//! The tagged-variant RANAP PDU shape the core dispatches on: a sum type over
//! (direction x procedure), per the "tagged-variant RANAP messages" design
//! note - the decoder hands back one of these, the dispatcher pattern-matches
//! it exhaustively.

use crate::ies::{Cause, GlobalRncId, RabSetupOrModifiedItem, RaId, Sai};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialUe {
    pub ra_id: RaId,
    pub global_rnc_id: GlobalRncId,
    pub sai: Sai,
    pub nas_pdu: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectTransfer {
    pub ra_id: Option<RaId>,
    pub sai: Option<Sai>,
    pub nas_pdu: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorIndication {
    pub cause: Option<Cause>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IuReleaseRequest {
    pub cause: Cause,
}

/// The CN-initiated counterpart of `IuReleaseRequest` - a distinct RANAP
/// procedure (Iu Release), not a reply to it. A dialogue can end either way:
/// the RNC asks first (`IuReleaseRequest`), or the CN tears it down
/// unprompted (`IuReleaseCommand`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IuReleaseCommand {
    pub cause: Cause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reset {
    pub cause: Cause,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RabAssignmentResponse {
    /// `None` when the SetupOrModifiedList IE was absent from the PDU.
    pub setup_or_modified_list: Option<Vec<RabSetupOrModifiedItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitiatingMessage {
    InitialUe(InitialUe),
    DirectTransfer(DirectTransfer),
    ErrorIndication(ErrorIndication),
    IuReleaseRequest(IuReleaseRequest),
    IuReleaseCommand(IuReleaseCommand),
    Reset(Reset),
    /// Forward-compatible: an initiating message whose procedure code this
    /// crate does not model.
    Other { procedure_code: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessfulOutcomeMessage {
    SecurityModeComplete,
    IuReleaseComplete,
    Other { procedure_code: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeMessage {
    RabAssignmentResponse(RabAssignmentResponse),
    Other { procedure_code: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsuccessfulOutcomeMessage {
    Other { procedure_code: u16 },
}

/// Top-level decoded RANAP PDU: direction x procedure, as the codec hands it
/// to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RanapPdu {
    Initiating(InitiatingMessage),
    SuccessfulOutcome(SuccessfulOutcomeMessage),
    UnsuccessfulOutcome(UnsuccessfulOutcomeMessage),
    Outcome(OutcomeMessage),
}
