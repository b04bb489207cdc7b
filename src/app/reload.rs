use tracing::debug;

pub(super) type RequestId = u64;

/// Tags load requests so that only the newest one may land. Results can
/// arrive in any order; everything older than the last issued id is stale.
#[derive(Debug, Default)]
pub(super) struct ReloadTracker {
    issued: RequestId,
    settled: bool,
}

impl ReloadTracker {
    pub(super) fn issue(&mut self) -> RequestId {
        self.issued += 1;
        self.settled = false;
        self.issued
    }

    pub(super) fn accept(&mut self, id: RequestId) -> bool {
        if id != self.issued || self.settled {
            debug!(id, latest = self.issued, "discarding superseded load result");
            return false;
        }
        self.settled = true;
        true
    }

    pub(super) fn in_flight(&self) -> bool {
        self.issued > 0 && !self.settled
    }
}
