//! Frameset Matcher - greedy cross-source matching.
//!
//! Each iteration picks the source whose current frame arrived last as the
//! reference, then looks for a frame within the threshold in every other
//! source, scanning forward from that source's cursor. The reference frame
//! is the latest of the current frames, so a source can only catch up by
//! skipping older frames, never by waiting.

use std::collections::BTreeMap;

use contracts::{
    ContractError, DataKind, FrameId, Frameset, FramesetMeta, SourceId, Timestamp,
    TimestampSource,
};
use tracing::{debug, trace};

use crate::cache::TimestampCache;

/// Per-source positions into the sorted frame lists of one run.
///
/// Positions only ever move forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cursors {
    positions: Vec<usize>,
}

impl Cursors {
    pub(crate) fn new(sources: usize) -> Self {
        Self {
            positions: vec![0; sources],
        }
    }

    pub(crate) fn get(&self, source: usize) -> usize {
        self.positions[source]
    }

    /// Move `source` to `position`; never moves backwards.
    pub(crate) fn advance_to(&mut self, source: usize, position: usize) {
        let current = &mut self.positions[source];
        *current = (*current).max(position);
    }

    pub(crate) fn advance_all(&mut self) {
        self.positions.iter_mut().for_each(|p| *p += 1);
    }

    /// Whether any cursor has run past the end of its list.
    pub(crate) fn any_exhausted(&self, lists: &[SourceFrames]) -> bool {
        self.positions
            .iter()
            .zip(lists)
            .any(|(&pos, list)| pos >= list.frames.len())
    }
}

/// Sorted frame ids of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceFrames {
    pub(crate) source: SourceId,
    pub(crate) frames: Vec<FrameId>,
}

/// What one matcher run produced.
#[derive(Debug, Default)]
pub(crate) struct MatchOutcome {
    pub(crate) framesets: Vec<Frameset>,
    pub(crate) iterations: u64,
    pub(crate) discarded: u64,
    pub(crate) misses: BTreeMap<SourceId, u64>,
}

enum Scan {
    Matched { position: usize, timestamp: Timestamp },
    Missed,
}

/// Run the matcher over `lists` in their given order.
pub(crate) fn match_framesets<T: TimestampSource + ?Sized>(
    lists: &[SourceFrames],
    kind: DataKind,
    threshold: Timestamp,
    timestamps: &mut TimestampCache<'_, T>,
) -> Result<MatchOutcome, ContractError> {
    if lists.is_empty() {
        return Err(ContractError::NoSources);
    }
    if let Some(empty) = lists.iter().find(|l| l.frames.is_empty()) {
        return Err(ContractError::empty_source_list(empty.source.as_str(), kind));
    }

    let mut outcome = MatchOutcome::default();
    let mut cursors = Cursors::new(lists.len());

    while !cursors.any_exhausted(lists) {
        outcome.iterations += 1;

        let mut current = Vec::with_capacity(lists.len());
        for (i, list) in lists.iter().enumerate() {
            current.push(timestamps.get(&list.source, kind, list.frames[cursors.get(i)])?);
        }

        let (reference, reference_ts) = latest(&current);

        let mut scans = Vec::with_capacity(lists.len());
        for (i, list) in lists.iter().enumerate() {
            let scan = if i == reference {
                Scan::Matched {
                    position: cursors.get(i),
                    timestamp: reference_ts,
                }
            } else {
                scan_source(list, cursors.get(i), kind, reference_ts, threshold, timestamps)?
            };
            scans.push(scan);
        }

        let missed: Vec<&SourceId> = scans
            .iter()
            .zip(lists)
            .filter(|(scan, _)| matches!(scan, Scan::Missed))
            .map(|(_, list)| &list.source)
            .collect();

        if missed.is_empty() {
            let mut frame_ids = Vec::with_capacity(lists.len());
            let mut deltas = Vec::with_capacity(lists.len());
            for (i, scan) in scans.iter().enumerate() {
                if let Scan::Matched { position, timestamp } = *scan {
                    frame_ids.push(lists[i].frames[position]);
                    deltas.push(timestamp - reference_ts);
                    cursors.advance_to(i, position + 1);
                }
            }

            debug!(
                %kind,
                reference = %lists[reference].source,
                reference_ts,
                ?frame_ids,
                "frameset matched"
            );
            outcome.framesets.push(Frameset {
                kind,
                frame_ids,
                meta: FramesetMeta {
                    reference_index: reference,
                    reference_source: lists[reference].source.clone(),
                    reference_timestamp: reference_ts,
                    deltas,
                },
            });
        } else {
            debug!(%kind, reference_ts, ?missed, "frameset discarded");
            outcome.discarded += 1;
            for source in missed {
                *outcome.misses.entry(source.clone()).or_default() += 1;
            }
            cursors.advance_all();
        }
    }

    Ok(outcome)
}

/// Index and value of the largest timestamp; ties go to the lowest index.
fn latest(current: &[Timestamp]) -> (usize, Timestamp) {
    let mut best = (0, current[0]);
    for (i, &ts) in current.iter().enumerate().skip(1) {
        if ts > best.1 {
            best = (i, ts);
        }
    }
    best
}

/// `|a - b| < threshold`, without overflow for any pair of timestamps.
pub(crate) fn within_threshold(a: Timestamp, b: Timestamp, threshold: Timestamp) -> bool {
    threshold > 0 && a.abs_diff(b) < threshold as u64
}

fn scan_source<T: TimestampSource + ?Sized>(
    list: &SourceFrames,
    from: usize,
    kind: DataKind,
    reference_ts: Timestamp,
    threshold: Timestamp,
    timestamps: &mut TimestampCache<'_, T>,
) -> Result<Scan, ContractError> {
    for position in from..list.frames.len() {
        let ts = timestamps.get(&list.source, kind, list.frames[position])?;
        if within_threshold(ts, reference_ts, threshold) {
            return Ok(Scan::Matched {
                position,
                timestamp: ts,
            });
        }
        if ts > reference_ts {
            trace!(source = %list.source, ts, reference_ts, "overshot reference");
            break;
        }
    }
    Ok(Scan::Missed)
}
