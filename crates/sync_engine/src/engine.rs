//! Sync engine facade.

use contracts::{
    ContractError, DataKind, FrameCatalog, Frameset, SourceId, SyncEngineConfig, Timestamp,
    TimestampSource,
};
use tracing::{info, instrument, warn};

use crate::binder::{self, BindOutcome};
use crate::cache::TimestampCache;
use crate::matcher::{self, MatchOutcome, SourceFrames};
use crate::report::{BindRun, BindStats, SyncReport, SyncRun, SyncStats};

/// Software synchronization over a frame catalog.
///
/// Holds no state between runs: every call lists the sources afresh and
/// starts with an empty timestamp cache, so two calls over the same corpus
/// return the same result.
#[derive(Debug)]
pub struct SyncEngine<C, T> {
    config: SyncEngineConfig,
    catalog: C,
    timestamps: T,
}

impl<C: FrameCatalog, T: TimestampSource> SyncEngine<C, T> {
    pub fn new(config: SyncEngineConfig, catalog: C, timestamps: T) -> Self {
        Self {
            config,
            catalog,
            timestamps,
        }
    }

    pub fn config(&self) -> &SyncEngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Synchronize `kind` frames with the configured threshold.
    pub fn sync(&mut self, sources: &[SourceId], kind: DataKind) -> Result<SyncRun, ContractError> {
        let threshold = self.config.threshold(kind);
        self.sync_with_threshold(sources, kind, threshold)
    }

    /// Synchronize `kind` frames across `sources`.
    ///
    /// # Errors
    /// - `NoSources` when `sources` is empty
    /// - `EmptySourceList` for the first source without frames; later
    ///   sources are not listed
    /// - metadata errors from any timestamp read
    #[instrument(
        name = "sync_engine_sync",
        skip(self, sources),
        fields(sources = sources.len(), kind = %kind, threshold = threshold)
    )]
    pub fn sync_with_threshold(
        &mut self,
        sources: &[SourceId],
        kind: DataKind,
        threshold: Timestamp,
    ) -> Result<SyncRun, ContractError> {
        let lists = self.list_sources(sources, kind)?;
        let mut cache = TimestampCache::new(
            &mut self.timestamps,
            &self.config.clock_offsets,
            self.config.cache_metadata,
        );

        let outcome = matcher::match_framesets(&lists, kind, threshold, &mut cache)?;
        let run = finish_sync(sources, kind, threshold, outcome, &cache);
        record_sync_metrics(&run);
        Ok(run)
    }

    /// Bind colour frames to depth framesets produced over `sources`.
    #[instrument(
        name = "sync_engine_bind",
        skip(self, sources, depth),
        fields(sources = sources.len(), depth_framesets = depth.len())
    )]
    pub fn bind_colour(
        &mut self,
        sources: &[SourceId],
        depth: &[Frameset],
    ) -> Result<BindRun, ContractError> {
        let threshold = self.config.colour_threshold;
        if depth.is_empty() {
            return Ok(BindRun {
                colour: Vec::new(),
                stats: BindStats {
                    threshold,
                    ..Default::default()
                },
            });
        }

        let colour_lists = self
            .list_sources(sources, DataKind::Colour)?
            .into_iter()
            .map(|list| list.frames)
            .collect::<Vec<_>>();
        let mut cache = TimestampCache::new(
            &mut self.timestamps,
            &self.config.clock_offsets,
            self.config.cache_metadata,
        );

        let outcome = binder::bind_colour(depth, sources, &colour_lists, threshold, &mut cache)?;
        let run = finish_bind(depth.len(), threshold, outcome, &cache);
        metrics::counter!("colour_framesets_bound_total").increment(run.stats.bound);
        metrics::counter!("colour_framesets_unbound_total").increment(run.stats.unbound);
        Ok(run)
    }

    /// Depth synchronization followed by colour binding.
    #[instrument(name = "sync_engine_run", skip(self, sources), fields(sources = sources.len()))]
    pub fn run(&mut self, sources: &[SourceId]) -> Result<SyncReport, ContractError> {
        let depth = self.sync(sources, DataKind::Depth)?;
        let colour = self.bind_colour(sources, &depth.framesets)?;

        info!(
            depth_framesets = depth.framesets.len(),
            colour_framesets = colour.colour.len(),
            unit = %self.config.unit,
            "synchronization finished"
        );

        Ok(SyncReport {
            unit: self.config.unit,
            depth,
            colour,
        })
    }

    /// List every source in order, stopping at the first empty one.
    fn list_sources(
        &self,
        sources: &[SourceId],
        kind: DataKind,
    ) -> Result<Vec<SourceFrames>, ContractError> {
        if sources.is_empty() {
            return Err(ContractError::NoSources);
        }

        let mut lists = Vec::with_capacity(sources.len());
        for source in sources {
            let mut frames = self.catalog.frame_ids(source, kind)?;
            if frames.is_empty() {
                return Err(ContractError::empty_source_list(source.as_str(), kind));
            }
            frames.sort_unstable();
            lists.push(SourceFrames {
                source: source.clone(),
                frames,
            });
        }
        Ok(lists)
    }
}

fn finish_sync<T: TimestampSource + ?Sized>(
    sources: &[SourceId],
    kind: DataKind,
    threshold: Timestamp,
    outcome: MatchOutcome,
    cache: &TimestampCache<'_, T>,
) -> SyncRun {
    let stats = SyncStats {
        threshold,
        iterations: outcome.iterations,
        emitted: outcome.framesets.len() as u64,
        discarded: outcome.discarded,
        misses: outcome.misses,
        metadata_reads: cache.reads(),
        cache_hits: cache.hits(),
    };

    if outcome.framesets.is_empty() {
        warn!(%kind, threshold, iterations = stats.iterations, "no framesets found");
    } else {
        info!(
            %kind,
            emitted = stats.emitted,
            discarded = stats.discarded,
            "frameset matching finished"
        );
    }

    SyncRun {
        kind,
        sources: sources.to_vec(),
        framesets: outcome.framesets,
        stats,
    }
}

fn finish_bind<T: TimestampSource + ?Sized>(
    depth_framesets: usize,
    threshold: Timestamp,
    outcome: BindOutcome,
    cache: &TimestampCache<'_, T>,
) -> BindRun {
    let stats = BindStats {
        threshold,
        depth_framesets: depth_framesets as u64,
        bound: outcome.colour.len() as u64,
        unbound: outcome.unbound,
        metadata_reads: cache.reads(),
        cache_hits: cache.hits(),
    };
    if outcome.colour.is_empty() {
        warn!(depth_framesets, threshold, "no colour framesets bound");
    }
    BindRun {
        colour: outcome.colour,
        stats,
    }
}

fn record_sync_metrics(run: &SyncRun) {
    let kind = run.kind.token();
    metrics::counter!("framesets_emitted_total", "kind" => kind).increment(run.stats.emitted);
    metrics::counter!("framesets_discarded_total", "kind" => kind).increment(run.stats.discarded);
    metrics::counter!("timestamp_cache_hits_total").increment(run.stats.cache_hits);
    for frameset in &run.framesets {
        metrics::histogram!("frameset_skew", "kind" => kind).record(frameset.meta.max_skew() as f64);
    }
    for (source, misses) in &run.stats.misses {
        metrics::counter!("source_misses_total", "source" => source.to_string()).increment(*misses);
    }
}
