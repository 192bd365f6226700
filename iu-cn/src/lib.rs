//! iu-cn - the core network side of the Iu interface adaptation layer:
//! SUA/SCCP primitives in, RANAP messages decoded and dispatched, a handful
//! of façade operations for the host (MSC/SGSN) to drive dialogues out.
//!
//! Module layout mirrors the component breakdown: `link` translates SCCP
//! primitives, `dispatch_co`/`dispatch_cl` decide what a decoded RANAP PDU
//! means, `ue_table`/`rnc_registry` hold the two pieces of state, `paging`
//! and `keys` are self-contained pieces of logic the façade calls into, and
//! `facade` is the public surface gluing all of it together.

mod dispatch_cl;
mod dispatch_co;
mod error;
mod events;
mod facade;
mod keys;
mod link;
mod paging;
mod rnc_registry;
mod ue_table;

pub use error::IuError;
pub use events::{IuEvents, UeEventKind};
pub use facade::{Config, IuAdaptor, PdpContextHandle};
pub use keys::{derive_ck, derive_ik};
pub use rnc_registry::RncRecord;
pub use ue_table::UeCtx;
