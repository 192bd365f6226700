//! RNC Registry (C3): the set of RNCs currently known, learned organically
//! from InitialUE messages rather than explicit HNBAP registration.

use async_std::sync::Mutex;
use slog::{info, Logger};
use std::collections::HashMap;
use sua::LinkId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RncRecord {
    pub rnc_id: u16,
    pub lac: u16,
    /// Routing Area Code, PS only.
    pub rac: Option<u8>,
    pub link: Option<LinkId>,
}

#[derive(Default)]
pub struct RncRegistry {
    by_id: Mutex<HashMap<u16, RncRecord>>,
}

impl RncRegistry {
    pub fn new() -> Self {
        RncRegistry::default()
    }

    /// Register a sighting of `rnc_id`. If a record already exists, its
    /// lac/rac/link are overwritten; a NOTICE is logged for each attribute
    /// that actually changed (matching the two independent log lines the
    /// source emits - attribute mismatch and link mismatch are logged
    /// separately, not combined).
    pub async fn register(&self, rnc_id: u16, lac: u16, rac: Option<u8>, link: LinkId, logger: &Logger) {
        let mut map = self.by_id.lock().await;
        match map.get_mut(&rnc_id) {
            Some(existing) => {
                if existing.lac != lac || existing.rac != rac {
                    info!(
                        logger,
                        "RNC {} changes its details: LAC={} RAC={:?} --> LAC={} RAC={:?}",
                        rnc_id,
                        existing.lac,
                        existing.rac,
                        lac,
                        rac
                    );
                }
                if existing.link != Some(link) {
                    info!(logger, "RNC {} on new link (LAC={} RAC={:?})", rnc_id, lac, rac);
                }
                existing.lac = lac;
                existing.rac = rac;
                existing.link = Some(link);
            }
            None => {
                info!(logger, "New RNC {} (LAC={} RAC={:?})", rnc_id, lac, rac);
                map.insert(
                    rnc_id,
                    RncRecord {
                        rnc_id,
                        lac,
                        rac,
                        link: Some(link),
                    },
                );
            }
        }
    }

    pub async fn iter(&self) -> Vec<RncRecord> {
        self.by_id.lock().await.values().copied().collect()
    }

    /// Remove every record whose link equals `link` - a full removal, not
    /// merely nulling the link field. A subsequent InitialUE will recreate
    /// the record.
    pub async fn invalidate_link(&self, link: LinkId) {
        self.by_id.lock().await.retain(|_, rnc| rnc.link != Some(link));
    }

    #[cfg(test)]
    pub async fn get(&self, rnc_id: u16) -> Option<RncRecord> {
        self.by_id.lock().await.get(&rnc_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::null_logger;

    #[async_std::test]
    async fn register_then_update() {
        let reg = RncRegistry::new();
        let logger = null_logger();
        let link1 = LinkId::new();
        reg.register(7, 0x1234, Some(0x56), link1, &logger).await;
        let rec = reg.get(7).await.unwrap();
        assert_eq!(rec.lac, 0x1234);
        assert_eq!(rec.rac, Some(0x56));
        assert_eq!(rec.link, Some(link1));

        let link2 = LinkId::new();
        reg.register(7, 0x9999, Some(0x10), link2, &logger).await;
        let rec = reg.get(7).await.unwrap();
        assert_eq!(rec.lac, 0x9999);
        assert_eq!(rec.link, Some(link2));
        assert_eq!(reg.iter().await.len(), 1);
    }

    #[async_std::test]
    async fn invalidate_link_removes_only_matching_records() {
        let reg = RncRegistry::new();
        let logger = null_logger();
        let link1 = LinkId::new();
        let link2 = LinkId::new();
        reg.register(7, 1, None, link1, &logger).await;
        reg.register(9, 2, None, link2, &logger).await;

        reg.invalidate_link(link1).await;

        assert!(reg.get(7).await.is_none());
        assert!(reg.get(9).await.is_some());
    }
}
