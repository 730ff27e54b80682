//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - configuration file -> engine -> framesets
//! - frameset selection -> working-set extraction
//! - parallel runs over one corpus

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use config_loader::ConfigLoader;
    use contracts::{CaptureBlueprint, ContractError, DataKind, SourceId, Timestamp};
    use corpus::{CorpusIndex, MetadataReader, MockCorpus};
    use observability::SyncMetricsAggregator;
    use sync_engine::{SyncEngine, SyncReport};
    use tempfile::TempDir;
    use workset::{Extractor, WorksetError, WorksetManifest};

    /// A capture directory with `uploads/` and a config file pointing at it
    struct Capture {
        dir: TempDir,
        mock: MockCorpus,
    }

    impl Capture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let uploads = dir.path().join("uploads");
            fs::create_dir(&uploads).unwrap();
            Self {
                mock: MockCorpus::new(&uploads),
                dir,
            }
        }

        fn uploads(&self) -> PathBuf {
            self.mock.root().to_path_buf()
        }

        fn stream(&self, source: &str, depth: &[Timestamp], colour: &[Timestamp]) -> &Self {
            self.mock.add_timestamps(source, DataKind::Depth, depth).unwrap();
            self.mock.add_timestamps(source, DataKind::Colour, colour).unwrap();
            self
        }

        /// Blueprint for `sources`, loaded through the config loader
        fn blueprint(&self, sources: &[&str], sync: &str) -> CaptureBlueprint {
            let mut toml = format!(
                "version = \"V1\"\n\n[corpus]\npath = \"{}\"\n\n",
                self.uploads().display()
            );
            for (i, source) in sources.iter().enumerate() {
                toml.push_str(&format!(
                    "[[sources]]\nid = \"{source}\"\nserial_number = \"13832225030{i}\"\n\n"
                ));
            }
            toml.push_str(sync);
            toml.push_str(&format!(
                "\n[workset]\noutput_dir = \"{}\"\n",
                self.dir.path().join("processing_data").display()
            ));

            let path = self.dir.path().join("capture.toml");
            fs::write(&path, toml).unwrap();
            ConfigLoader::load_from_path(&path).unwrap()
        }
    }

    fn engine(blueprint: &CaptureBlueprint) -> SyncEngine<CorpusIndex, MetadataReader> {
        SyncEngine::new(
            blueprint.to_sync_engine_config(),
            CorpusIndex::new(&blueprint.corpus.path, &blueprint.corpus.depth_extension),
            MetadataReader::new(&blueprint.corpus.path),
        )
    }

    fn run(blueprint: &CaptureBlueprint) -> Result<SyncReport, ContractError> {
        engine(blueprint).run(&blueprint.source_ids())
    }

    fn depth_ids(report: &SyncReport) -> Vec<Vec<u64>> {
        report
            .depth
            .framesets
            .iter()
            .map(|f| f.frame_ids.clone())
            .collect()
    }

    /// Config file -> depth sync -> colour binding, with the
    /// diff == threshold pair rejected at 5 and accepted at 6.
    #[test]
    fn test_e2e_threshold_boundary() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200, 300], &[101, 201, 301])
            .stream("raspi2", &[101, 199, 305], &[100, 200, 304]);

        let strict = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        let report = run(&strict).unwrap();
        assert_eq!(depth_ids(&report), vec![vec![0, 0], vec![1, 1]]);
        assert_eq!(report.depth.stats.discarded, 1);

        let wide = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 6\n");
        let report = run(&wide).unwrap();
        assert_eq!(depth_ids(&report), vec![vec![0, 0], vec![1, 1], vec![2, 2]]);
        assert_eq!(report.colour.colour.len(), 3);
        for (i, colour) in report.colour.colour.iter().enumerate() {
            assert_eq!(colour.depth_index, i);
            assert_eq!(colour.frame_ids, vec![i as u64, i as u64]);
        }
    }

    #[test]
    fn test_e2e_disjoint_streams() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200], &[100, 200])
            .stream("raspi2", &[500, 600], &[500, 600]);

        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        let report = run(&blueprint).unwrap();
        assert!(report.depth.is_empty());
        assert!(report.colour.colour.is_empty());
        assert_eq!(report.colour.stats.depth_framesets, 0);
    }

    #[test]
    fn test_e2e_gap_and_colour_binding() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200, 300], &[95, 210, 290])
            .stream("raspi2", &[100, 300], &[104, 296]);

        let blueprint = capture.blueprint(
            &["raspi1", "raspi2"],
            "[sync]\ndepth_threshold = 5\ncolour_threshold = 12\n",
        );
        let report = run(&blueprint).unwrap();
        assert_eq!(depth_ids(&report), vec![vec![0, 0], vec![2, 1]]);

        let tagged: Vec<_> = report.colour.colour.iter().map(|c| c.to_tagged()).collect();
        assert_eq!(tagged, vec![vec![0, 0, 0], vec![2, 1, 1]]);
    }

    #[test]
    fn test_e2e_empty_source_is_fatal() {
        let capture = Capture::new();
        capture.stream("raspi1", &[100, 200], &[100, 200]);
        capture.mock.add_timestamps("raspi3", DataKind::Depth, &[100]).unwrap();

        let blueprint = capture.blueprint(
            &["raspi1", "raspi2", "raspi3"],
            "[sync]\ndepth_threshold = 5\n",
        );
        let err = run(&blueprint).unwrap_err();
        assert!(matches!(
            err,
            ContractError::EmptySourceList { ref source_id, kind: DataKind::Depth }
                if source_id == "raspi2"
        ));
    }

    #[test]
    fn test_e2e_clock_offset_aligns_streams() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[1_000, 2_000], &[1_000, 2_000])
            .stream("raspi2", &[1_500, 2_500], &[1_500, 2_500]);

        let unaligned = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 10\n");
        assert!(run(&unaligned).unwrap().depth.is_empty());

        let aligned = capture.blueprint(
            &["raspi1", "raspi2"],
            "[sync]\ndepth_threshold = 10\n[sync.clock_offsets]\nraspi2 = -500\n",
        );
        let report = run(&aligned).unwrap();
        assert_eq!(depth_ids(&report), vec![vec![0, 0], vec![1, 1]]);
        assert_eq!(report.colour.colour.len(), 2);
    }

    #[test]
    fn test_e2e_missing_sidecar_is_an_error() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200], &[100, 200])
            .stream("raspi2", &[100, 200], &[100, 200]);
        fs::remove_file(capture.uploads().join("raspi2_depth_metadata_0.txt")).unwrap();

        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        let err = run(&blueprint).unwrap_err();
        assert!(matches!(err, ContractError::MetadataMissing { .. }));
    }

    #[test]
    fn test_e2e_corpus_noise_is_tolerated() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200], &[100, 200])
            .stream("raspi2", &[100, 200], &[100, 200]);
        capture.mock.add_depth_image("raspi1", 0).unwrap();
        capture.mock.add_raw("raspi1_depth_x.csv", "").unwrap();
        capture.mock.add_raw("notes.txt", "calibration day").unwrap();

        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        let report = run(&blueprint).unwrap();
        assert_eq!(depth_ids(&report), vec![vec![0, 0], vec![1, 1]]);
    }

    #[test]
    fn test_e2e_custom_depth_extension() {
        let capture = Capture::new();
        let mock = MockCorpus::new(capture.uploads()).with_depth_extension("raw");
        for source in ["raspi1", "raspi2"] {
            mock.add_timestamps(source, DataKind::Depth, &[100, 200]).unwrap();
            mock.add_timestamps(source, DataKind::Colour, &[100, 200]).unwrap();
        }

        let mut blueprint =
            capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        blueprint.corpus.depth_extension = "raw".to_string();
        let report = run(&blueprint).unwrap();
        assert_eq!(report.depth.framesets.len(), 2);
    }

    #[test]
    fn test_e2e_report_json_round_trip() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200, 300], &[101, 201, 301])
            .stream("raspi2", &[101, 199, 305], &[100, 200, 304]);
        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 6\n");
        let report = run(&blueprint).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"unit\":\"milliseconds\""));
        let back: SyncReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_e2e_aggregated_summary() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200, 300], &[101, 201, 301])
            .stream("raspi2", &[101, 199, 305], &[100, 200, 304]);
        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        let report = run(&blueprint).unwrap();

        let mut aggregator = SyncMetricsAggregator::new();
        for frameset in &report.depth.framesets {
            aggregator.update(&frameset.meta, report.sources());
        }
        aggregator.record_discarded(report.depth.stats.discarded, &report.depth.stats.misses);
        aggregator.record_colour(report.colour.stats.bound, report.colour.stats.unbound);

        let summary = aggregator.summary();
        assert_eq!(summary.total_framesets, 2);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.colour_bound, 2);
        assert_eq!(summary.max_skew.max, 1.0);
    }

    /// Select a colour frameset, move its files out, check the manifest.
    #[test]
    fn test_e2e_extract_selected_frameset() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200, 300], &[101, 201, 301])
            .stream("raspi2", &[101, 199, 305], &[100, 200, 304]);
        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 6\n");
        let report = run(&blueprint).unwrap();

        let (depth, colour) = report.pair(2).unwrap();
        let extracted = Extractor::new(&blueprint.corpus.path, &blueprint.workset.output_dir)
            .extract(report.sources(), depth, colour)
            .unwrap();

        assert!(extracted.is_complete());
        assert_eq!(extracted.moved.len(), 8);
        let work = &blueprint.workset.output_dir;
        assert!(work.join("raspi1_depth_2.csv").is_file());
        assert!(work.join("raspi2_colour_metadata_2.txt").is_file());
        assert!(!blueprint.corpus.path.join("raspi1_depth_2.csv").exists());

        let manifest = WorksetManifest::read(work).unwrap();
        assert_eq!(manifest.depth_frame_ids, vec![2, 2]);
        assert_eq!(manifest.colour_frame_ids, vec![2, 2]);
        assert_eq!(manifest.depth_index, 2);

        // the remaining corpus still synchronizes
        let report = run(&blueprint).unwrap();
        assert_eq!(depth_ids(&report), vec![vec![0, 0], vec![1, 1]]);
        assert!(report.pair(2).is_none());
    }

    #[test]
    fn test_e2e_extract_and_delete_remainder() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200], &[100, 200])
            .stream("raspi2", &[100, 200], &[100, 200]);
        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        let report = run(&blueprint).unwrap();
        let (depth, colour) = report.pair(0).unwrap();

        let extracted = Extractor::new(&blueprint.corpus.path, &blueprint.workset.output_dir)
            .with_delete_remainder(true)
            .extract(report.sources(), depth, colour)
            .unwrap();

        assert_eq!(extracted.removed, 8);
        assert_eq!(fs::read_dir(&blueprint.corpus.path).unwrap().count(), 0);
    }

    #[test]
    fn test_e2e_parent_working_dir_leaves_corpus_intact() {
        let capture = Capture::new();
        capture
            .stream("raspi1", &[100, 200], &[100, 200])
            .stream("raspi2", &[100, 200], &[100, 200]);
        let blueprint = capture.blueprint(&["raspi1", "raspi2"], "[sync]\ndepth_threshold = 5\n");
        let report = run(&blueprint).unwrap();
        let (depth, colour) = report.pair(0).unwrap();
        let before = corpus_listing(&blueprint.corpus.path);

        let err = Extractor::new(&blueprint.corpus.path, capture.dir.path())
            .extract(report.sources(), depth, colour)
            .unwrap_err();
        assert!(matches!(err, WorksetError::WorkingDirContainsCorpus { .. }));
        assert_eq!(corpus_listing(&blueprint.corpus.path), before);

        let mut unsafe_config = blueprint.clone();
        unsafe_config.workset.output_dir = capture.dir.path().to_path_buf();
        let toml = ConfigLoader::to_toml(&unsafe_config).unwrap();
        let err = ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("must not contain the corpus"), "{err}");
    }

    fn corpus_listing(root: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Runs over one corpus are independent and leave it untouched.
    #[tokio::test]
    async fn test_e2e_parallel_runs_agree() {
        let capture = Capture::new();
        let depth: Vec<Timestamp> = (0..50).map(|i| 1_000 + i * 33).collect();
        let colour: Vec<Timestamp> = depth.iter().map(|t| t + 2).collect();
        capture
            .stream("raspi1", &depth, &colour)
            .stream("raspi2", &depth, &colour)
            .stream("raspi3", &depth, &colour);
        let blueprint = capture.blueprint(
            &["raspi1", "raspi2", "raspi3"],
            "[sync]\ndepth_threshold = 10\n",
        );
        let before = corpus_listing(&blueprint.corpus.path);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let blueprint = blueprint.clone();
                tokio::task::spawn_blocking(move || run(&blueprint))
            })
            .collect();

        let mut reports = Vec::new();
        for handle in handles {
            reports.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(reports[0].depth.framesets.len(), 50);
        assert_eq!(reports[0].colour.colour.len(), 50);
        assert!(reports.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(corpus_listing(&blueprint.corpus.path), before);
    }

    #[test]
    fn test_e2e_source_ids_follow_declaration_order() {
        let capture = Capture::new();
        capture
            .stream("raspi2", &[100], &[100])
            .stream("raspi1", &[100], &[100]);
        let blueprint = capture.blueprint(&["raspi2", "raspi1"], "[sync]\ndepth_threshold = 5\n");
        let report = run(&blueprint).unwrap();
        assert_eq!(
            report.sources(),
            &[SourceId::from("raspi2"), SourceId::from("raspi1")]
        );
    }
}
