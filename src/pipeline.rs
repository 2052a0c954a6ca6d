//! Build orchestration: raw records in, shards plus manifest and metadata out.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{DatasetConfig, FilterSpec, ProcessingSpec};
use crate::constants::pipeline::PROGRESS_REPORT_EVERY_MS;
use crate::data::CleanRecord;
use crate::errors::BuildError;
use crate::filter::accept;
use crate::manifest::{ManifestBuilder, ManifestEntry, ManifestPaths, shard_file_name};
use crate::metadata::{BuildStats, VersionMetadata};
use crate::sharding::partition;
use crate::source::{RawSource, RecordStream};
use crate::utils::normalize_text;
use crate::writer::write_shard;

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Everything a finished build produced.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    /// The persisted metadata document.
    pub metadata: VersionMetadata,
    /// Manifest entries in shard order.
    pub manifest: Vec<ManifestEntry>,
    /// `<base_dir>/<dataset_name>/<version>`.
    pub version_dir: PathBuf,
    /// Where `manifest.txt` and `manifest.json` were written.
    pub manifest_paths: ManifestPaths,
    /// Where `metadata.json` was written.
    pub metadata_path: PathBuf,
}

/// Builds one dataset version from one raw source.
///
/// Records stream through normalization and filtering straight into a
/// shard-sized buffer, so at most one shard is held in memory. Shards are
/// written as they fill; the manifest files and then `metadata.json` are
/// written only after every shard succeeded, so a failed build leaves at most
/// orphan shard files and never a manifest describing partial data.
pub struct BuildPipeline {
    config: DatasetConfig,
    clock: Clock,
}

impl BuildPipeline {
    /// Validate `config` and prepare a pipeline. Nothing is written yet.
    pub fn new(config: DatasetConfig) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Box::new(Utc::now),
        })
    }

    /// Replace the completion-time source (defaults to `Utc::now`).
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Validated configuration this pipeline builds.
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Open the source described by the config and build from it.
    pub fn run_configured(&self) -> Result<BuildOutcome, BuildError> {
        let mut source = self.config.source_spec()?.open()?;
        self.run(source.as_mut())
    }

    /// Build the version from `source`.
    pub fn run(&self, source: &mut dyn RawSource) -> Result<BuildOutcome, BuildError> {
        let config = &self.config;
        let shard_size = config.shard_size()?;
        let version_dir = config.version_dir();
        let shards_dir = config.shards_dir();
        info!(
            dataset = %config.output.dataset_name,
            version = %config.version,
            output = %version_dir.display(),
            source_id = %source.id(),
            "building dataset version"
        );

        let text_field = source.text_field().to_string();
        let expected = source.reported_record_count();
        let source_id = source.id().to_string();
        let stream = source.records()?;
        fs::create_dir_all(&shards_dir).map_err(BuildError::io_at(&shards_dir))?;

        let mut curated = CuratedRecords::new(
            stream,
            text_field,
            config.processing,
            config.filters,
            Progress::new(source_id, expected),
        );
        let mut manifest = ManifestBuilder::new();
        let mut estimated_num_tokens = 0usize;

        let mut shards = partition(&mut curated, shard_size)?;
        while let Some(group) = shards.next() {
            shards.inner_mut().check()?;
            let file_name = shard_file_name(manifest.len());
            let path = shards_dir.join(&file_name);
            let write = write_shard(&path, &group)?;
            estimated_num_tokens += group.iter().map(CleanRecord::estimated_tokens).sum::<usize>();
            debug!(
                shard = %file_name,
                records = write.record_count,
                "appended manifest entry"
            );
            manifest.push(ManifestEntry::new(file_name, &write));
        }
        shards.inner_mut().check()?;
        drop(shards);

        let stats = BuildStats {
            num_raw_examples: curated.raw_count,
            num_examples: curated.kept_count,
            num_shards: manifest.len(),
            estimated_num_tokens,
        };
        debug_assert_eq!(manifest.total_records(), stats.num_examples);
        info!(
            kept = stats.num_examples,
            raw = stats.num_raw_examples,
            shards = stats.num_shards,
            "kept records after filtering"
        );

        let manifest_paths = manifest.persist(&version_dir)?;
        let metadata = VersionMetadata::from_build(config, stats, (self.clock)());
        let metadata_path = metadata.persist(&version_dir)?;
        info!(
            metadata = %metadata_path.display(),
            manifest = %manifest_paths.text.display(),
            "build complete"
        );

        Ok(BuildOutcome {
            metadata,
            manifest: manifest.into_entries(),
            version_dir,
            manifest_paths,
            metadata_path,
        })
    }
}

/// Build `config` from `source` and return the version metadata.
pub fn build(
    config: &DatasetConfig,
    source: &mut dyn RawSource,
) -> Result<VersionMetadata, BuildError> {
    let outcome = BuildPipeline::new(config.clone())?.run(source)?;
    Ok(outcome.metadata)
}

/// Raw stream → normalized, filtered records, counting both sides.
///
/// A source failure ends iteration and is held until [`CuratedRecords::check`].
struct CuratedRecords<'a> {
    raw: RecordStream<'a>,
    text_field: String,
    processing: ProcessingSpec,
    filters: FilterSpec,
    raw_count: usize,
    kept_count: usize,
    failure: Option<BuildError>,
    failed: bool,
    progress: Progress,
}

impl<'a> CuratedRecords<'a> {
    fn new(
        raw: RecordStream<'a>,
        text_field: String,
        processing: ProcessingSpec,
        filters: FilterSpec,
        progress: Progress,
    ) -> Self {
        Self {
            raw,
            text_field,
            processing,
            filters,
            raw_count: 0,
            kept_count: 0,
            failure: None,
            failed: false,
            progress,
        }
    }

    /// Surface a deferred source failure.
    fn check(&mut self) -> Result<(), BuildError> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Iterator for CuratedRecords<'_> {
    type Item = CleanRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let raw = match self.raw.next()? {
                Ok(raw) => raw,
                Err(err) => {
                    self.failure = Some(err);
                    self.failed = true;
                    return None;
                }
            };
            self.raw_count += 1;
            let text = normalize_text(raw.text(&self.text_field), &self.processing);
            let kept = accept(Some(&text), &self.filters);
            if kept {
                self.kept_count += 1;
            }
            self.progress.tick(self.raw_count, self.kept_count);
            if kept {
                return Some(CleanRecord::new(text));
            }
        }
    }
}

/// Periodic progress logging while a source is consumed.
struct Progress {
    source_id: String,
    expected: Option<usize>,
    started: Instant,
    last_report: Instant,
    every: Duration,
}

impl Progress {
    fn new(source_id: String, expected: Option<usize>) -> Self {
        let now = Instant::now();
        Self {
            source_id,
            expected,
            started: now,
            last_report: now,
            every: Duration::from_millis(PROGRESS_REPORT_EVERY_MS),
        }
    }

    fn tick(&mut self, raw: usize, kept: usize) {
        if self.last_report.elapsed() < self.every {
            return;
        }
        info!(
            source_id = %self.source_id,
            raw,
            kept,
            expected = ?self.expected,
            elapsed_s = self.started.elapsed().as_secs_f64(),
            "processing records"
        );
        self.last_report = Instant::now();
    }
}
