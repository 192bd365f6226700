//! `RanapCodec`: the abstract shape of the out-of-tree RANAP encoder/decoder
//! the core depends on - a narrow, hand-written surface covering only the
//! message shapes the core dispatches on, not a general ASN.1 PER
//! implementation.

use crate::ies::{Cause, CauseGroup, GlobalRncId, KeyStatus, RabSetupOrModifiedItem, RaId, Sai};
use crate::messages::{
    DirectTransfer, ErrorIndication, InitialUe, InitiatingMessage, IuReleaseCommand,
    IuReleaseRequest, OutcomeMessage, RabAssignmentResponse, RanapPdu, Reset,
    SuccessfulOutcomeMessage,
    UnsuccessfulOutcomeMessage,
};
use crate::plmn::{decode_plmn, encode_plmn};
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid PLMN identity size: should be 3, is {0}")]
    InvalidPlmnSize(usize),
    #[error("truncated RANAP PDU")]
    Truncated,
    #[error("unknown direction tag {0}")]
    UnknownDirection(u8),
}

// Wire tags. These are this crate's own framing, not 3GPP ASN.1 PER values -
// full PER compliance is out of scope (see Non-goals).
mod tag {
    pub const DIR_INITIATING: u8 = 0;
    pub const DIR_SUCCESSFUL_OUTCOME: u8 = 1;
    pub const DIR_UNSUCCESSFUL_OUTCOME: u8 = 2;
    pub const DIR_OUTCOME: u8 = 3;

    pub const PROC_INITIAL_UE: u16 = 1;
    pub const PROC_DIRECT_TRANSFER: u16 = 2;
    pub const PROC_ERROR_INDICATION: u16 = 3;
    pub const PROC_IU_RELEASE_REQUEST: u16 = 4;
    pub const PROC_RESET: u16 = 5;
    pub const PROC_SECURITY_MODE_CONTROL: u16 = 6;
    pub const PROC_IU_RELEASE: u16 = 7;
    pub const PROC_RAB_ASSIGNMENT: u16 = 8;
    pub const PROC_RESET_ACKNOWLEDGE: u16 = 9;
    pub const PROC_IU_RAB_DEACTIVATE: u16 = 10;
}

struct Writer(Vec<u8>);

impl Writer {
    fn new() -> Self {
        Writer(Vec::with_capacity(64))
    }
    fn u8(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }
    fn u16(&mut self, v: u16) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }
    fn u32(&mut self, v: u32) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }
    fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.u16(v.len() as u16);
        self.0.extend_from_slice(v);
        self
    }
    fn opt<T>(&mut self, v: &Option<T>, f: impl FnOnce(&mut Self, &T)) -> &mut Self {
        match v {
            Some(x) => {
                self.u8(1);
                f(self, x);
            }
            None => {
                self.u8(0);
            }
        }
        self
    }
    fn finish(self) -> Vec<u8> {
        self.0
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }
    fn u8(&mut self) -> Result<u8, DecodeError> {
        let b = *self.buf.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }
    fn u16(&mut self) -> Result<u16, DecodeError> {
        let s = self
            .buf
            .get(self.pos..self.pos + 2)
            .ok_or(DecodeError::Truncated)?;
        self.pos += 2;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }
    fn u32(&mut self) -> Result<u32, DecodeError> {
        let s = self
            .buf
            .get(self.pos..self.pos + 4)
            .ok_or(DecodeError::Truncated)?;
        self.pos += 4;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }
    fn bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.u16()? as usize;
        let s = self
            .buf
            .get(self.pos..self.pos + len)
            .ok_or(DecodeError::Truncated)?;
        self.pos += len;
        Ok(s.to_vec())
    }
    fn present(&mut self) -> Result<bool, DecodeError> {
        Ok(self.u8()? != 0)
    }
}

fn write_ra_id(w: &mut Writer, r: &RaId) {
    w.bytes(&encode_plmn(r.mcc, r.mnc));
    w.u16(r.lac);
    w.u8(r.rac);
}

fn read_ra_id(r: &mut Reader) -> Result<RaId, DecodeError> {
    let plmn = r.bytes()?;
    let (mcc, mnc) = decode_plmn(&plmn)?;
    let lac = r.u16()?;
    let rac = r.u8()?;
    Ok(RaId { mcc, mnc, lac, rac })
}

fn write_sai(w: &mut Writer, s: &Sai) {
    w.bytes(&encode_plmn(s.mcc, s.mnc));
    w.u16(s.lac);
    w.u16(s.sac);
}

fn read_sai(r: &mut Reader) -> Result<Sai, DecodeError> {
    let plmn = r.bytes()?;
    let (mcc, mnc) = decode_plmn(&plmn)?;
    let lac = r.u16()?;
    let sac = r.u16()?;
    Ok(Sai { mcc, mnc, lac, sac })
}

fn write_cause(w: &mut Writer, c: &Cause) {
    let group = match c.group {
        CauseGroup::RadioNetwork => 0,
        CauseGroup::Transport => 1,
        CauseGroup::Nas => 2,
        CauseGroup::Protocol => 3,
        CauseGroup::Misc => 4,
        CauseGroup::NonStandard => 5,
    };
    w.u8(group);
    w.u8(c.value);
}

fn read_cause(r: &mut Reader) -> Result<Cause, DecodeError> {
    let group = match r.u8()? {
        0 => CauseGroup::RadioNetwork,
        1 => CauseGroup::Transport,
        2 => CauseGroup::Nas,
        3 => CauseGroup::Protocol,
        4 => CauseGroup::Misc,
        _ => CauseGroup::NonStandard,
    };
    let value = r.u8()?;
    Ok(Cause { group, value })
}

/// The abstract RANAP codec interface the core depends on: decode incoming
/// bytes into a tagged `RanapPdu`, and encode the outgoing message kinds the
/// core originates (RAB-Assignment-Request CS/PS, Security-Mode-Command,
/// Direct-Transfer, Iu-Release-Command, Paging-Command, Reset-Acknowledge,
/// Iu-RAB-Deactivate).
pub trait RanapCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<RanapPdu, DecodeError>;

    fn encode_rab_assignment_cs(&self, rab_id: u8, rtp_ipv4: Ipv4Addr, rtp_port: u16) -> Vec<u8>;
    fn encode_rab_assignment_ps(&self, rab_id: u8, ggsn_ipv4: Ipv4Addr, teid: u32) -> Vec<u8>;
    fn encode_security_mode_command(
        &self,
        ik: [u8; 16],
        ck: Option<[u8; 16]>,
        key_status: KeyStatus,
    ) -> Vec<u8>;
    fn encode_direct_transfer(&self, sapi: u8, nas_pdu: &[u8]) -> Vec<u8>;
    fn encode_iu_release_command(&self, cause: Cause) -> Vec<u8>;
    fn encode_paging_command(
        &self,
        imsi: &str,
        tmsi_or_ptmsi: Option<u32>,
        is_ps: bool,
    ) -> Vec<u8>;
    fn encode_reset_acknowledge(&self) -> Vec<u8>;
    fn encode_iu_rab_deactivate(&self, rab_id: u8) -> Vec<u8>;
}

/// Reference implementation of `RanapCodec` used by tests and the bundled
/// mock RNC. Not an ASN.1 PER encoder - see the module doc comment.
#[derive(Debug, Default, Clone, Copy)]
pub struct WireCodec;

impl RanapCodec for WireCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RanapPdu, DecodeError> {
        let mut r = Reader::new(bytes);
        let direction = r.u8()?;
        let procedure_code = r.u16()?;
        use tag::*;
        Ok(match direction {
            DIR_INITIATING => RanapPdu::Initiating(match procedure_code {
                PROC_INITIAL_UE => {
                    let ra_id = read_ra_id(&mut r)?;
                    let mcc_mnc_rnc = r.u16()?; // rnc_id lives directly, mcc/mnc share the LAI's PLMN
                    let global_rnc_id = GlobalRncId {
                        mcc: ra_id.mcc,
                        mnc: ra_id.mnc,
                        rnc_id: mcc_mnc_rnc,
                    };
                    let sai = read_sai(&mut r)?;
                    let nas_pdu = r.bytes()?;
                    InitiatingMessage::InitialUe(InitialUe {
                        ra_id,
                        global_rnc_id,
                        sai,
                        nas_pdu,
                    })
                }
                PROC_DIRECT_TRANSFER => {
                    let ra_id = if r.present()? {
                        Some(read_ra_id(&mut r)?)
                    } else {
                        None
                    };
                    let sai = if r.present()? {
                        Some(read_sai(&mut r)?)
                    } else {
                        None
                    };
                    let nas_pdu = r.bytes()?;
                    InitiatingMessage::DirectTransfer(DirectTransfer {
                        ra_id,
                        sai,
                        nas_pdu,
                    })
                }
                PROC_ERROR_INDICATION => {
                    let cause = if r.present()? {
                        Some(read_cause(&mut r)?)
                    } else {
                        None
                    };
                    InitiatingMessage::ErrorIndication(ErrorIndication { cause })
                }
                PROC_IU_RELEASE_REQUEST => {
                    let cause = read_cause(&mut r)?;
                    InitiatingMessage::IuReleaseRequest(IuReleaseRequest { cause })
                }
                PROC_RESET => {
                    let cause = read_cause(&mut r)?;
                    InitiatingMessage::Reset(Reset { cause })
                }
                PROC_IU_RELEASE => {
                    let cause = read_cause(&mut r)?;
                    InitiatingMessage::IuReleaseCommand(IuReleaseCommand { cause })
                }
                other => InitiatingMessage::Other {
                    procedure_code: other,
                },
            }),
            DIR_SUCCESSFUL_OUTCOME => RanapPdu::SuccessfulOutcome(match procedure_code {
                PROC_SECURITY_MODE_CONTROL => SuccessfulOutcomeMessage::SecurityModeComplete,
                PROC_IU_RELEASE => SuccessfulOutcomeMessage::IuReleaseComplete,
                other => SuccessfulOutcomeMessage::Other {
                    procedure_code: other,
                },
            }),
            DIR_OUTCOME => RanapPdu::Outcome(match procedure_code {
                PROC_RAB_ASSIGNMENT => {
                    let setup_or_modified_list = if r.present()? {
                        let count = r.u8()? as usize;
                        let mut items = Vec::with_capacity(count);
                        for _ in 0..count {
                            let rab_id = r.u8()?;
                            let dl_transport_address = if r.present()? {
                                Some(Ipv4Addr::from(r.u32()?))
                            } else {
                                None
                            };
                            let dl_teid = if r.present()? { Some(r.u32()?) } else { None };
                            items.push(RabSetupOrModifiedItem {
                                rab_id,
                                dl_transport_address,
                                dl_teid,
                            });
                        }
                        Some(items)
                    } else {
                        None
                    };
                    OutcomeMessage::RabAssignmentResponse(RabAssignmentResponse {
                        setup_or_modified_list,
                    })
                }
                other => OutcomeMessage::Other {
                    procedure_code: other,
                },
            }),
            DIR_UNSUCCESSFUL_OUTCOME => {
                RanapPdu::UnsuccessfulOutcome(UnsuccessfulOutcomeMessage::Other {
                    procedure_code,
                })
            }
            other => return Err(DecodeError::UnknownDirection(other)),
        })
    }

    fn encode_rab_assignment_cs(&self, rab_id: u8, rtp_ipv4: Ipv4Addr, rtp_port: u16) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING)
            .u16(tag::PROC_RAB_ASSIGNMENT)
            .u8(rab_id)
            .u8(0) // domain: CS
            .u32(u32::from(rtp_ipv4))
            .u16(rtp_port);
        w.finish()
    }

    fn encode_rab_assignment_ps(&self, rab_id: u8, ggsn_ipv4: Ipv4Addr, teid: u32) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING)
            .u16(tag::PROC_RAB_ASSIGNMENT)
            .u8(rab_id)
            .u8(1) // domain: PS
            .u32(u32::from(ggsn_ipv4))
            .u32(teid);
        w.finish()
    }

    fn encode_security_mode_command(
        &self,
        ik: [u8; 16],
        ck: Option<[u8; 16]>,
        key_status: KeyStatus,
    ) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING)
            .u16(tag::PROC_SECURITY_MODE_CONTROL)
            .bytes(&ik);
        w.opt(&ck, |w, ck| {
            w.bytes(ck);
        });
        w.u8(match key_status {
            KeyStatus::New => 0,
            KeyStatus::Old => 1,
        });
        w.finish()
    }

    fn encode_direct_transfer(&self, sapi: u8, nas_pdu: &[u8]) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING)
            .u16(tag::PROC_DIRECT_TRANSFER)
            .u8(sapi)
            .bytes(nas_pdu);
        w.finish()
    }

    fn encode_iu_release_command(&self, cause: Cause) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING).u16(tag::PROC_IU_RELEASE);
        write_cause(&mut w, &cause);
        w.finish()
    }

    fn encode_paging_command(
        &self,
        imsi: &str,
        tmsi_or_ptmsi: Option<u32>,
        is_ps: bool,
    ) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING).u16(0); // Paging has no reply, tag by convention only
        w.bytes(imsi.as_bytes());
        w.opt(&tmsi_or_ptmsi, |w, t| {
            w.u32(*t);
        });
        w.u8(u8::from(is_ps));
        w.finish()
    }

    fn encode_reset_acknowledge(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_SUCCESSFUL_OUTCOME)
            .u16(tag::PROC_RESET_ACKNOWLEDGE);
        w.finish()
    }

    fn encode_iu_rab_deactivate(&self, rab_id: u8) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING)
            .u16(tag::PROC_IU_RAB_DEACTIVATE)
            .u8(rab_id);
        w.finish()
    }
}

/// Encoders for the RNC side of messages `WireCodec` only ever decodes in
/// production (the core never originates them). Used by the bundled mock
/// RNC and its integration tests to produce realistic stimulus bytes.
pub mod test_support {
    use super::*;

    pub fn encode_initial_ue(ie: &InitialUe) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING).u16(tag::PROC_INITIAL_UE);
        write_ra_id(&mut w, &ie.ra_id);
        w.u16(ie.global_rnc_id.rnc_id);
        write_sai(&mut w, &ie.sai);
        w.bytes(&ie.nas_pdu);
        w.finish()
    }

    pub fn encode_iu_release_request(cause: Cause) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING).u16(tag::PROC_IU_RELEASE_REQUEST);
        write_cause(&mut w, &cause);
        w.finish()
    }

    /// `items` is (rab_id, dl_transport_address, dl_teid) per entry.
    pub fn encode_rab_assignment_response(items: &[(u8, Option<Ipv4Addr>, Option<u32>)]) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(tag::DIR_OUTCOME).u16(tag::PROC_RAB_ASSIGNMENT);
        w.u8(1); // SetupOrModifiedList present
        w.u8(items.len() as u8);
        for (rab_id, addr, teid) in items {
            w.u8(*rab_id);
            w.opt(addr, |w, a| {
                w.u32(u32::from(*a));
            });
            w.opt(teid, |w, t| {
                w.u32(*t);
            });
        }
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ies::{GlobalRncId, RaId, Sai};

    fn sample_initial_ue() -> Vec<u8> {
        let codec = WireCodec;
        let ra_id = RaId {
            mcc: 262,
            mnc: 2,
            lac: 0x1234,
            rac: 0x56,
        };
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING).u16(tag::PROC_INITIAL_UE);
        write_ra_id(&mut w, &ra_id);
        w.u16(7); // rnc_id
        write_sai(
            &mut w,
            &Sai {
                mcc: 262,
                mnc: 2,
                lac: 0x1234,
                sac: 1,
            },
        );
        w.bytes(b"\x08\x29nas-pdu");
        let _ = codec;
        w.finish()
    }

    #[test]
    fn decode_initial_ue_round_trip() {
        let bytes = sample_initial_ue();
        let pdu = WireCodec.decode(&bytes).unwrap();
        match pdu {
            RanapPdu::Initiating(InitiatingMessage::InitialUe(ie)) => {
                assert_eq!(ie.ra_id.lac, 0x1234);
                assert_eq!(ie.ra_id.rac, 0x56);
                assert_eq!(
                    ie.global_rnc_id,
                    GlobalRncId {
                        mcc: 262,
                        mnc: 2,
                        rnc_id: 7
                    }
                );
                assert_eq!(ie.nas_pdu, b"\x08\x29nas-pdu");
            }
            other => panic!("unexpected pdu {other:?}"),
        }
    }

    #[test]
    fn unknown_procedure_is_forward_compatible() {
        let mut w = Writer::new();
        w.u8(tag::DIR_INITIATING).u16(0xffff);
        let pdu = WireCodec.decode(&w.finish()).unwrap();
        assert_eq!(
            pdu,
            RanapPdu::Initiating(InitiatingMessage::Other {
                procedure_code: 0xffff
            })
        );
    }

    #[test]
    fn unknown_direction_is_a_decode_error() {
        let bytes = [0xff, 0, 0];
        assert_eq!(
            WireCodec.decode(&bytes).unwrap_err(),
            DecodeError::UnknownDirection(0xff)
        );
    }
}
