//! Per-run timestamp cache.

use std::collections::HashMap;

use contracts::{ContractError, DataKind, FrameId, SourceId, Timestamp, TimestampSource};

/// Memoizes arrival timestamps for one run and applies static clock offsets.
///
/// Created at the start of a run and dropped at its end, so nothing leaks
/// between runs.
pub(crate) struct TimestampCache<'a, T: ?Sized> {
    inner: &'a mut T,
    offsets: &'a HashMap<SourceId, Timestamp>,
    memo: Option<HashMap<(SourceId, DataKind, FrameId), Timestamp>>,
    reads: u64,
    hits: u64,
}

impl<'a, T: TimestampSource + ?Sized> TimestampCache<'a, T> {
    pub(crate) fn new(
        inner: &'a mut T,
        offsets: &'a HashMap<SourceId, Timestamp>,
        enabled: bool,
    ) -> Self {
        Self {
            inner,
            offsets,
            memo: enabled.then(HashMap::new),
            reads: 0,
            hits: 0,
        }
    }

    /// Timestamp of one frame, corrected by the source's clock offset.
    pub(crate) fn get(
        &mut self,
        source: &SourceId,
        kind: DataKind,
        frame: FrameId,
    ) -> Result<Timestamp, ContractError> {
        let key = (source.clone(), kind, frame);
        if let Some(&ts) = self.memo.as_ref().and_then(|memo| memo.get(&key)) {
            self.hits += 1;
            return Ok(ts);
        }

        let raw = self.inner.arrival_timestamp(source, kind, frame)?;
        self.reads += 1;
        let ts = raw.saturating_add(self.offsets.get(source).copied().unwrap_or(0));
        if let Some(memo) = self.memo.as_mut() {
            memo.insert(key, ts);
        }
        Ok(ts)
    }

    /// Reads that reached the underlying source
    pub(crate) fn reads(&self) -> u64 {
        self.reads
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits
    }
}
