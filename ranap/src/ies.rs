//! Information elements shared across RANAP messages.

use std::net::Ipv4Addr;

/// Routing Area identity as resolved from LAI (+ RAC, PS only). RAC is 0 when
/// the message is CS-only and carries no RAC IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaId {
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u16,
    pub rac: u8,
}

/// Service Area Identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sai {
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u16,
    pub sac: u16,
}

/// Parsed RANAP GlobalRNC-ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalRncId {
    pub mcc: u16,
    pub mnc: u16,
    pub rnc_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CauseGroup {
    RadioNetwork,
    Transport,
    Nas,
    Protocol,
    Misc,
    NonStandard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cause {
    pub group: CauseGroup,
    pub value: u8,
}

impl Cause {
    pub const RADIO_NETWORK_NORMAL_RELEASE: Cause = Cause {
        group: CauseGroup::RadioNetwork,
        value: 1,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    New,
    Old,
}

/// One entry of a decoded RAB-Assignment SetupOrModifiedList. Only the
/// fields the core cares about for delivering a RAB-ASSIGN event are
/// retained; the full IE group also carries QoS and transport layer
/// information not consumed above this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RabSetupOrModifiedItem {
    pub rab_id: u8,
    pub dl_transport_address: Option<Ipv4Addr>,
    pub dl_teid: Option<u32>,
}
