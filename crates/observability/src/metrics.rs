//! Run metrics
//!
//! Aggregates the framesets of a synchronization run into statistics that
//! can be printed after the run, next to the live `metrics` counters.

use std::collections::BTreeMap;

use contracts::{DataKind, FramesetMeta, SourceId};
use metrics::{counter, gauge, histogram};

/// Record one emitted frameset.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_frameset;
///
/// for frameset in &run.framesets {
///     record_frameset(run.kind, &frameset.meta);
/// }
/// ```
pub fn record_frameset(kind: DataKind, meta: &FramesetMeta) {
    counter!(
        "framesync_reference_total",
        "kind" => kind.token(),
        "source" => meta.reference_source.to_string()
    )
    .increment(1);
    histogram!("framesync_max_skew", "kind" => kind.token()).record(meta.max_skew() as f64);
}

/// Record the number of frames a source has in the corpus
pub fn record_corpus_frames(source: &str, kind: DataKind, count: usize) {
    gauge!(
        "framesync_corpus_frames",
        "source" => source.to_string(),
        "kind" => kind.token()
    )
    .set(count as f64);
}

/// Record wall time of one CLI command
pub fn record_command_duration_ms(command: &'static str, duration_ms: f64) {
    histogram!("framesync_command_duration_ms", "command" => command).record(duration_ms);
}

/// Run aggregator
///
/// Keeps statistics in memory for a summary at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct SyncMetricsAggregator {
    /// Emitted framesets
    pub total_framesets: u64,

    /// Matcher iterations that produced nothing
    pub discarded: u64,

    /// Colour framesets bound / depth framesets left without colour
    pub colour_bound: u64,
    pub colour_unbound: u64,

    /// Largest distance to the reference per frameset
    pub skew_stats: RunningStats,

    /// Absolute distance to the reference, per source
    pub delta_stats: BTreeMap<SourceId, RunningStats>,

    /// How often each source supplied the reference frame
    pub reference_counts: BTreeMap<SourceId, u64>,

    /// Discarded iterations blamed on each source
    pub missing_counts: BTreeMap<SourceId, u64>,
}

impl SyncMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one emitted frameset; `sources` is the run's source order.
    pub fn update(&mut self, meta: &FramesetMeta, sources: &[SourceId]) {
        self.total_framesets += 1;
        self.skew_stats.push(meta.max_skew() as f64);
        *self
            .reference_counts
            .entry(meta.reference_source.clone())
            .or_insert(0) += 1;

        for (source, delta) in sources.iter().zip(&meta.deltas) {
            if *source == meta.reference_source {
                continue;
            }
            self.delta_stats
                .entry(source.clone())
                .or_default()
                .push(delta.abs() as f64);
        }
    }

    /// Add the discarded iterations of a run.
    pub fn record_discarded<'a>(
        &mut self,
        discarded: u64,
        misses: impl IntoIterator<Item = (&'a SourceId, &'a u64)>,
    ) {
        self.discarded += discarded;
        for (source, count) in misses {
            *self.missing_counts.entry(source.clone()).or_insert(0) += count;
        }
    }

    pub fn record_colour(&mut self, bound: u64, unbound: u64) {
        self.colour_bound += bound;
        self.colour_unbound += unbound;
    }

    pub fn summary(&self) -> MetricsSummary {
        let iterations = self.total_framesets + self.discarded;
        MetricsSummary {
            total_framesets: self.total_framesets,
            discarded: self.discarded,
            match_rate: if iterations > 0 {
                self.total_framesets as f64 / iterations as f64 * 100.0
            } else {
                0.0
            },
            colour_bound: self.colour_bound,
            colour_unbound: self.colour_unbound,
            max_skew: StatsSummary::from(&self.skew_stats),
            source_deltas: self
                .delta_stats
                .iter()
                .map(|(source, stats)| (source.clone(), StatsSummary::from(stats)))
                .collect(),
            reference_counts: self.reference_counts.clone(),
            missing_counts: self.missing_counts.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary of an aggregated run
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_framesets: u64,
    pub discarded: u64,
    /// Percentage of matcher iterations that emitted a frameset
    pub match_rate: f64,
    pub colour_bound: u64,
    pub colour_unbound: u64,
    pub max_skew: StatsSummary,
    pub source_deltas: BTreeMap<SourceId, StatsSummary>,
    pub reference_counts: BTreeMap<SourceId, u64>,
    pub missing_counts: BTreeMap<SourceId, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Summary ===")?;
        writeln!(
            f,
            "Framesets: {} ({:.2}% of iterations)",
            self.total_framesets, self.match_rate
        )?;
        writeln!(f, "Discarded iterations: {}", self.discarded)?;
        writeln!(
            f,
            "Colour framesets: {} bound, {} unbound",
            self.colour_bound, self.colour_unbound
        )?;
        writeln!(f, "Max skew: {}", self.max_skew)?;

        if !self.source_deltas.is_empty() {
            writeln!(f, "Distance to reference:")?;
            for (source, stats) in &self.source_deltas {
                writeln!(f, "  {source}: {stats}")?;
            }
        }
        if !self.reference_counts.is_empty() {
            writeln!(f, "Reference source counts:")?;
            for (source, count) in &self.reference_counts {
                writeln!(f, "  {source}: {count}")?;
            }
        }
        if !self.missing_counts.is_empty() {
            writeln!(f, "Miss counts:")?;
            for (source, count) in &self.missing_counts {
                writeln!(f, "  {source}: {count}")?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
