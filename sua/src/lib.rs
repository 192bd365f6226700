//! sua - SCCP-User-Adaptation primitive types and a reference transport.
//!
//! This crate is the core's "south" dependency: it defines the shape of
//! the primitive interface the core consumes and provides one concrete
//! transport so the workspace can be exercised end-to-end. See
//! `transport` module docs for what it deliberately does not implement.

pub mod primitives;
pub mod transport;

pub use primitives::{ConnId, LinkId, SccpPrimitive, SccpUserService, SendError};
pub use transport::{
    read_frame_from_half, write_frame, Frame, SctpSuaService, TransportEvent, KIND_CONNECT_IND,
    KIND_CONNECT_RESP, KIND_DATA_IND, KIND_DATA_REQ, KIND_DISCONNECT_IND, KIND_UNITDATA_IND,
    KIND_UNITDATA_REQ,
};
