/// Constants describing the persisted version directory layout.
pub mod layout {
    /// Subdirectory of a version that holds shard files.
    pub const SHARDS_DIR: &str = "shards";
    /// Human-readable manifest file name.
    pub const MANIFEST_TXT: &str = "manifest.txt";
    /// Machine-readable manifest file name.
    pub const MANIFEST_JSON: &str = "manifest.json";
    /// Version metadata file name.
    pub const METADATA_JSON: &str = "metadata.json";
    /// Prefix of every shard file name.
    pub const SHARD_PREFIX: &str = "part-";
    /// Extension of every shard file name.
    pub const SHARD_EXTENSION: &str = "jsonl";
    /// Suffix appended to a target path while its content is being written.
    pub const PARTIAL_SUFFIX: &str = ".partial";
}

/// Default filter and record settings.
pub mod records {
    /// Default JSON field holding record text.
    pub const DEFAULT_TEXT_FIELD: &str = "text";
    /// Default lower bound on normalized text length (chars, inclusive).
    pub const DEFAULT_MIN_CHARS: usize = 0;
    /// Default upper bound on normalized text length (chars, inclusive).
    pub const DEFAULT_MAX_CHARS: usize = 10_000_000;
}

/// Constants used by the build pipeline.
pub mod pipeline {
    /// Interval between progress log lines while consuming a source.
    pub const PROGRESS_REPORT_EVERY_MS: u64 = 750;
}

/// Constants used by the inspection utility.
pub mod inspect {
    /// Default dataset directory inspected when none is given.
    pub const DEFAULT_BASE_DIR: &str = "data/versions/demo-wikitext";
    /// Max characters of sample text printed before truncation.
    pub const SAMPLE_PREVIEW_CHARS: usize = 500;
    /// Marker appended to truncated sample text.
    pub const TRUNCATION_MARKER: &str = "...";
    /// Line printed when the picked shard has no records.
    pub const EMPTY_SHARD_MSG: &str = "(shard is empty)";
    /// Line printed when the manifest lists no shards.
    pub const EMPTY_MANIFEST_MSG: &str = "No shards found in manifest.";
}

/// Constants used when reading raw sources.
pub mod sources {
    /// Log message used when malformed raw input is kept as an empty record.
    pub const MALFORMED_RECORD_MSG: &str = "keeping malformed raw input as empty record";
}
