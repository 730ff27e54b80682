//! Cross-Kind Binder - colour frames for each depth frameset.

use contracts::{
    ColourFrameset, ContractError, DataKind, FrameId, Frameset, SourceId, Timestamp,
    TimestampSource,
};
use tracing::debug;

use crate::cache::TimestampCache;
use crate::matcher::within_threshold;

/// What one binder run produced.
#[derive(Debug, Default)]
pub(crate) struct BindOutcome {
    pub(crate) colour: Vec<ColourFrameset>,
    pub(crate) unbound: u64,
}

/// Bind one colour frame per source to every depth frameset.
///
/// `sources[i]` and `colour_lists[i]` describe column `i` of every depth
/// frameset. Each search restarts at the beginning of the colour list.
pub(crate) fn bind_colour<T: TimestampSource + ?Sized>(
    depth_framesets: &[Frameset],
    sources: &[SourceId],
    colour_lists: &[Vec<FrameId>],
    threshold: Timestamp,
    timestamps: &mut TimestampCache<'_, T>,
) -> Result<BindOutcome, ContractError> {
    let mut outcome = BindOutcome::default();

    for (depth_index, depth) in depth_framesets.iter().enumerate() {
        if depth.len() != sources.len() {
            return Err(ContractError::FramesetShape {
                expected: sources.len(),
                actual: depth.len(),
            });
        }

        let mut frame_ids = Vec::with_capacity(sources.len());
        for (i, source) in sources.iter().enumerate() {
            let depth_ts = timestamps.get(source, DataKind::Depth, depth.frame_ids[i])?;
            match closest_colour(source, &colour_lists[i], depth_ts, threshold, timestamps)? {
                Some(frame) => frame_ids.push(frame),
                None => {
                    debug!(depth_index, %source, depth_ts, "no colour frame within threshold");
                    break;
                }
            }
        }

        if frame_ids.len() == sources.len() {
            outcome.colour.push(ColourFrameset {
                frame_ids,
                depth_index,
            });
        } else {
            outcome.unbound += 1;
        }
    }

    Ok(outcome)
}

/// First colour frame within `threshold` of `depth_ts`.
fn closest_colour<T: TimestampSource + ?Sized>(
    source: &SourceId,
    colour: &[FrameId],
    depth_ts: Timestamp,
    threshold: Timestamp,
    timestamps: &mut TimestampCache<'_, T>,
) -> Result<Option<FrameId>, ContractError> {
    for &frame in colour {
        let ts = timestamps.get(source, DataKind::Colour, frame)?;
        if within_threshold(ts, depth_ts, threshold) {
            return Ok(Some(frame));
        }
        if ts > depth_ts.saturating_add(threshold) {
            break;
        }
    }
    Ok(None)
}
