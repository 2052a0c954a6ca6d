/// Identifier for the raw source that produced records.
/// Examples: `jsonl:corpus/wiki.jsonl`, `text_dir:corpus/articles`, `inline`
pub type SourceId = String;
/// Dataset version identifier, also the version directory name.
/// Example: `v1.0.0`
pub type VersionId = String;
/// Dataset name, also the parent directory of every version.
/// Example: `demo-wikitext`
pub type DatasetName = String;
/// Shard file name relative to the `shards/` directory.
/// Example: `part-00003.jsonl`
pub type ShardFileName = String;
/// Lowercase hex SHA-256 digest (64 chars).
/// Example: `9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08`
pub type ContentHash = String;
/// Name of the JSON field holding record text.
/// Example: `text`
pub type TextField = String;
