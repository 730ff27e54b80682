//! Run statistics.

use std::time::Duration;

use contracts::TimeUnit;
use observability::SyncMetricsAggregator;
use sync_engine::SyncReport;

/// Statistics of one synchronization run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Wall time of the run
    pub duration: Duration,

    /// Number of sources synchronized
    pub sources: usize,

    /// Unit of every timestamp in the run
    pub unit: TimeUnit,

    /// Sidecar reads that reached the disk, depth and colour
    pub metadata_reads: u64,

    /// Timestamp cache hits, depth and colour
    pub cache_hits: u64,

    /// Frameset aggregation
    pub sync_metrics: SyncMetricsAggregator,
}

impl RunStats {
    /// Aggregate `report` and record its framesets on the metrics recorder.
    pub fn from_report(report: &SyncReport, duration: Duration) -> Self {
        let mut sync_metrics = SyncMetricsAggregator::new();
        for frameset in &report.depth.framesets {
            observability::record_frameset(report.depth.kind, &frameset.meta);
            sync_metrics.update(&frameset.meta, report.sources());
        }
        sync_metrics.record_discarded(report.depth.stats.discarded, &report.depth.stats.misses);
        sync_metrics.record_colour(report.colour.stats.bound, report.colour.stats.unbound);

        Self {
            duration,
            sources: report.sources().len(),
            unit: report.unit,
            metadata_reads: report.depth.stats.metadata_reads + report.colour.stats.metadata_reads,
            cache_hits: report.depth.stats.cache_hits + report.colour.stats.cache_hits,
            sync_metrics,
        }
    }

    /// Framesets emitted per second of wall time
    pub fn framesets_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.sync_metrics.total_framesets as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Run Statistics ===");
        println!("Duration: {:.3}s", self.duration.as_secs_f64());
        println!("Sources: {}", self.sources);
        println!("Framesets/s: {:.2}", self.framesets_per_sec());
        println!(
            "Metadata reads: {} ({} cache hits)",
            self.metadata_reads, self.cache_hits
        );
        println!("Timestamps in: {}", self.unit);
        println!();
        print!("{}", self.sync_metrics.summary());
        println!();
    }
}
