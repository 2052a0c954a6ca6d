use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use serde_json::Value;
use tempfile::tempdir;

use dataset_versions::{
    BuildOutcome, BuildPipeline, CleanRecord, DatasetConfig, FilterSpec, InMemorySource,
    ManifestEntry, ProcessingSpec, RawRecord, VersionMetadata, build, load_manifest, sha256_file,
};

fn build_config(base_dir: &Path, shard_size: i64, filters: FilterSpec) -> DatasetConfig {
    let mut config = DatasetConfig::from_yaml_str(&format!(
        "
version: v1.0.0
source:
  kind: inline
  records: []
output:
  base_dir: {}
  dataset_name: demo-wikitext
  shard_size: {shard_size}
",
        base_dir.display()
    ))
    .unwrap();
    config.filters = filters;
    config
}

fn fixed_pipeline(config: DatasetConfig) -> BuildPipeline {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    BuildPipeline::new(config).unwrap().with_clock(move || at)
}

fn run_texts(config: DatasetConfig, texts: &[&str]) -> BuildOutcome {
    let mut source = InMemorySource::from_texts("mem", texts.iter().copied());
    fixed_pipeline(config).run(&mut source).unwrap()
}

fn shard_files(version_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(version_dir.join("shards"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

fn read_shard_records(path: &Path) -> Vec<CleanRecord> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn single_record_is_cleaned_kept_and_sharded() {
    let dir = tempdir().unwrap();
    let config = build_config(
        dir.path(),
        1,
        FilterSpec {
            min_chars: 5,
            max_chars: 100,
        },
    );
    let outcome = run_texts(config, &["  Hello   world  \n\n "]);

    let shard = outcome.version_dir.join("shards/part-00000.jsonl");
    assert_eq!(
        fs::read_to_string(&shard).unwrap(),
        "{\"text\":\"Hello world\"}\n"
    );
    assert_eq!(outcome.manifest.len(), 1);
    assert_eq!(outcome.manifest[0].record_count, 1);
    assert_eq!(outcome.manifest[0].file_name, "part-00000.jsonl");

    let manifest_txt = fs::read_to_string(outcome.version_dir.join("manifest.txt")).unwrap();
    let expected_hash = sha256_file(&shard).unwrap();
    assert_eq!(
        manifest_txt,
        format!("part-00000.jsonl sha256={expected_hash} num_records=1\n")
    );
    assert_eq!(outcome.metadata.num_examples, 1);
    assert_eq!(outcome.metadata.estimated_num_tokens, 2);
}

#[test]
fn empty_source_produces_empty_manifests_and_no_shards() {
    let dir = tempdir().unwrap();
    let outcome = run_texts(build_config(dir.path(), 4, FilterSpec::default()), &[]);

    assert_eq!(outcome.metadata.num_shards, 0);
    assert_eq!(outcome.metadata.num_examples, 0);
    assert_eq!(outcome.metadata.num_raw_examples, 0);
    assert_eq!(outcome.metadata.estimated_num_tokens, 0);
    assert!(shard_files(&outcome.version_dir).is_empty());
    assert_eq!(
        fs::read_to_string(outcome.version_dir.join("manifest.json")).unwrap(),
        "[]"
    );
    assert_eq!(
        fs::read_to_string(outcome.version_dir.join("manifest.txt")).unwrap(),
        ""
    );
}

#[test]
fn records_below_min_chars_are_dropped() {
    let dir = tempdir().unwrap();
    let config = build_config(
        dir.path(),
        4,
        FilterSpec {
            min_chars: 10,
            max_chars: 100,
        },
    );
    let outcome = run_texts(config, &["  abc \n de "]);
    assert_eq!(outcome.metadata.num_raw_examples, 1);
    assert_eq!(outcome.metadata.num_examples, 0);
    assert_eq!(outcome.metadata.num_shards, 0);
}

#[test]
fn seven_records_split_three_three_one() {
    let dir = tempdir().unwrap();
    let texts = ["r0", "r1", "r2", "r3", "r4", "r5", "r6"];
    let outcome = run_texts(build_config(dir.path(), 3, FilterSpec::default()), &texts);

    let counts: Vec<usize> = outcome.manifest.iter().map(|e| e.record_count).collect();
    assert_eq!(counts, vec![3, 3, 1]);
    assert_eq!(outcome.metadata.num_shards, 3);
    let names: Vec<String> = shard_files(&outcome.version_dir)
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["part-00000.jsonl", "part-00001.jsonl", "part-00002.jsonl"]
    );
}

#[test]
fn concatenated_shards_reproduce_kept_records_in_order() {
    let dir = tempdir().unwrap();
    let texts: Vec<String> = (0..53)
        .map(|idx| match idx % 5 {
            0 => "  ".to_string(),
            1 => format!("line {idx}\n\n  continued  "),
            _ => format!("record number {idx}"),
        })
        .collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let filters = FilterSpec {
        min_chars: 1,
        max_chars: 1_000,
    };
    let outcome = run_texts(build_config(dir.path(), 4, filters), &refs);

    let expected: Vec<CleanRecord> = texts
        .iter()
        .map(|text| dataset_versions::normalize_text(Some(text), &ProcessingSpec::default()))
        .filter(|text| filters.accepts(text))
        .map(CleanRecord::new)
        .collect();
    let actual: Vec<CleanRecord> = shard_files(&outcome.version_dir)
        .iter()
        .flat_map(|path| read_shard_records(path))
        .collect();
    assert_eq!(actual, expected);
    assert_eq!(outcome.metadata.num_raw_examples, 53);
    assert!(outcome.metadata.num_raw_examples >= outcome.metadata.num_examples);
}

#[test]
fn manifest_counts_sum_to_num_examples() {
    let dir = tempdir().unwrap();
    let texts: Vec<String> = (0..25).map(|idx| "w ".repeat(idx)).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let filters = FilterSpec {
        min_chars: 3,
        max_chars: 30,
    };
    let outcome = run_texts(build_config(dir.path(), 6, filters), &refs);

    let total: usize = outcome.manifest.iter().map(|e| e.record_count).sum();
    assert_eq!(total, outcome.metadata.num_examples);
    for path in shard_files(&outcome.version_dir) {
        for record in read_shard_records(&path) {
            let len = record.text.chars().count();
            assert!((3..=30).contains(&len), "len {len} escaped the filter");
        }
    }
    let expected_tokens: usize = shard_files(&outcome.version_dir)
        .iter()
        .flat_map(|path| read_shard_records(path))
        .map(|record| record.estimated_tokens())
        .sum();
    assert_eq!(outcome.metadata.estimated_num_tokens, expected_tokens);
}

#[test]
fn rehashing_shards_reproduces_manifest_hashes() {
    let dir = tempdir().unwrap();
    let texts = ["α β γ", "東京 タワー", "plain ascii", "naïve café", "x"];
    let outcome = run_texts(build_config(dir.path(), 2, FilterSpec::default()), &texts);

    let shards_dir = outcome.version_dir.join("shards");
    for entry in load_manifest(&outcome.version_dir).unwrap() {
        assert_eq!(
            sha256_file(&shards_dir.join(&entry.file_name)).unwrap(),
            entry.content_hash
        );
        assert!(entry.verify(&shards_dir).unwrap());
    }
    let raw = fs::read_to_string(shards_dir.join("part-00000.jsonl")).unwrap();
    assert!(raw.contains("東京 タワー"));
}

#[test]
fn rebuilding_is_byte_identical() {
    let first_dir = tempdir().unwrap();
    let second_dir = tempdir().unwrap();
    let texts: Vec<String> = (0..40).map(|idx| format!("  doc {idx}\n\nbody {idx} ")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    let first = run_texts(build_config(first_dir.path(), 7, FilterSpec::default()), &refs);
    let second = run_texts(build_config(second_dir.path(), 7, FilterSpec::default()), &refs);

    assert_eq!(first.manifest, second.manifest);
    let first_files = shard_files(&first.version_dir);
    let second_files = shard_files(&second.version_dir);
    assert_eq!(first_files.len(), second_files.len());
    for (a, b) in first_files.iter().zip(&second_files) {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
    for name in ["manifest.txt", "manifest.json"] {
        assert_eq!(
            fs::read(first.version_dir.join(name)).unwrap(),
            fs::read(second.version_dir.join(name)).unwrap()
        );
    }
}

#[test]
fn rebuilding_into_existing_version_overwrites_consistently() {
    let dir = tempdir().unwrap();
    let config = build_config(dir.path(), 2, FilterSpec::default());
    let first = run_texts(config.clone(), &["a", "b", "c"]);
    let second = run_texts(config, &["a", "b", "c"]);
    assert_eq!(first.manifest, second.manifest);
    assert_eq!(shard_files(&second.version_dir).len(), 2);
}

#[test]
fn malformed_raw_records_count_as_empty_text() {
    let dir = tempdir().unwrap();
    let mut source = InMemorySource::new(
        "mem",
        vec![
            RawRecord::new(serde_json::json!({"text": "kept"})),
            RawRecord::new(serde_json::json!({"title": "no text"})),
            RawRecord::new(serde_json::json!(17)),
        ],
    );
    let config = build_config(dir.path(), 10, FilterSpec::default());
    let metadata = build(&config, &mut source).unwrap();

    assert_eq!(metadata.num_raw_examples, 3);
    // Empty text still satisfies the default bounds.
    assert_eq!(metadata.num_examples, 3);
    let shard = config.shards_dir().join("part-00000.jsonl");
    assert_eq!(
        fs::read_to_string(shard).unwrap(),
        "{\"text\":\"kept\"}\n{\"text\":\"\"}\n{\"text\":\"\"}\n"
    );
}

#[test]
fn metadata_document_matches_outcome() {
    let dir = tempdir().unwrap();
    let outcome = run_texts(
        build_config(dir.path(), 2, FilterSpec::default()),
        &["one two", "three"],
    );
    let raw: Value =
        serde_json::from_str(&fs::read_to_string(&outcome.metadata_path).unwrap()).unwrap();
    assert_eq!(raw["version"], "v1.0.0");
    assert_eq!(raw["dataset_name"], "demo-wikitext");
    assert_eq!(raw["created_at"], "2025-01-01T12:00:00.000000Z");
    assert_eq!(raw["num_raw_examples"], 2);
    assert_eq!(raw["num_examples"], 2);
    assert_eq!(raw["num_shards"], 1);
    assert_eq!(raw["estimated_num_tokens"], 3);
    assert_eq!(raw["shard_size"], 2);
    assert_eq!(raw["source"]["kind"], "inline");

    let loaded = VersionMetadata::load(&outcome.version_dir).unwrap();
    assert_eq!(loaded, outcome.metadata);
    let manifest: Vec<ManifestEntry> = load_manifest(&outcome.version_dir).unwrap();
    assert_eq!(manifest, outcome.manifest);
}
