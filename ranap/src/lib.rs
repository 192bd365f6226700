//! ranap - information elements, tagged message shapes and the codec trait
//! for RANAP (Radio Access Network Application Part) signaling between a
//! core network adaptor and a 3G RNC/HNB-GW, as consumed by the `iu-cn`
//! adaptation core.
//!
//! This crate intentionally does not implement 3GPP ASN.1 PER: full RANAP
//! encoding is out of tree. `WireCodec` is a narrow, self-consistent
//! reference codec for the message shapes the core actually dispatches on.

pub mod codec;
pub mod ies;
pub mod messages;
pub mod plmn;

pub use codec::{DecodeError, RanapCodec, WireCodec};
pub use ies::{Cause, CauseGroup, GlobalRncId, KeyStatus, RabSetupOrModifiedItem, RaId, Sai};
pub use messages::{
    DirectTransfer, ErrorIndication, InitialUe, InitiatingMessage, IuReleaseCommand,
    IuReleaseRequest, OutcomeMessage, RabAssignmentResponse, RanapPdu, Reset,
    SuccessfulOutcomeMessage, UnsuccessfulOutcomeMessage,
};
pub use plmn::{decode_plmn, encode_plmn, PLMN_IDENTITY_LEN};
