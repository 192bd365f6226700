//! Paging Engine (C6): fan a page request out to every RNC whose registered
//! location area (and, for PS, routing area) matches, sending one RANAP
//! Paging PDU per match over N-UNITDATA.

use crate::facade::IuAdaptor;
use slog::warn;

/// Connection-less RANAP SSN pair for Paging: source 1, destination 2.
const PAGING_CALLING_SSN: u8 = 1;
const PAGING_CALLED_SSN: u8 = 2;

impl IuAdaptor {
    /// Page for `imsi`/`key` in every RNC covering `lac`. `rac` restricts the
    /// search to RNCs that have also reported that routing area (PS paging);
    /// `None` pages every RNC covering the LAC regardless of routing area
    /// (CS paging).
    pub(crate) async fn page(
        &self,
        imsi: &str,
        key: Option<u32>,
        lac: u16,
        rac: Option<u8>,
    ) -> usize {
        let is_ps = rac.is_some();
        let bytes = self.codec.encode_paging_command(imsi, key, is_ps);
        let mut paged = 0;
        for rnc in self.rnc_registry.iter().await {
            if rnc.lac != lac {
                continue;
            }
            if let Some(rac) = rac {
                if rnc.rac != Some(rac) {
                    continue;
                }
            }
            let Some(link) = rnc.link else { continue };
            match self
                .sccp
                .send_unitdata(link, bytes.clone(), PAGING_CALLING_SSN, PAGING_CALLED_SSN)
                .await
            {
                Ok(()) => paged += 1,
                Err(e) => warn!(self.logger, "paging RNC {} failed: {e}", rnc.rnc_id),
            }
        }
        paged
    }
}
