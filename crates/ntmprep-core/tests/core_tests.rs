use std::collections::HashSet;
use tempfile::TempDir;

use ntmprep_core::config::PipelineConfig;
use ntmprep_core::data_processor::{filter_by_label, read_documents, write_documents, DataProcessor, SplitConfig};
use ntmprep_core::error::{Error, ErrorKind};
use ntmprep_core::store::{FsBlobStore, MemoryBlobStore};
use ntmprep_core::traits::BlobStore;

fn long_docs(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("review number {i:03} with enough padding text to clear the length floor")).collect()
}

#[test]
fn partition_is_disjoint_and_exhaustive() {
    let docs = long_docs(20);
    let processor = DataProcessor::with_config(SplitConfig { train_fraction: 0.5, ..SplitConfig::default() });
    let splits = processor.partition(docs.clone()).expect("partition");

    // n=20: split=10, remainder=5 -> validation 5, test 0, demo 5
    assert_eq!(splits.train.len(), 10);
    assert_eq!(splits.validation.len(), 5);
    assert_eq!(splits.test.len(), 0);
    assert_eq!(splits.demo.len(), 5);
    assert_eq!(splits.train.len() + splits.validation.len() + splits.test.len(), docs.len() - 5);

    let mut seen = HashSet::new();
    for d in splits.train.iter().chain(&splits.validation).chain(&splits.test).chain(&splits.demo) {
        assert!(seen.insert(d.clone()), "document appears twice: {d}");
    }
    assert_eq!(seen, docs.into_iter().collect::<HashSet<_>>());
}

#[test]
fn seeded_shuffle_is_reproducible() {
    let docs = long_docs(20);
    let processor = DataProcessor::new();
    let a = processor.partition(docs.clone()).expect("first");
    let b = processor.partition(docs.clone()).expect("second");
    assert_eq!(a, b);

    let other = DataProcessor::with_config(SplitConfig { seed: 7, ..SplitConfig::default() });
    let c = other.partition(docs).expect("other seed");
    assert_ne!(a.train, c.train, "a different seed should permute differently");
}

#[test]
fn short_documents_are_dropped_before_slicing() {
    let mut docs = long_docs(12);
    docs.push("too short".to_string());
    docs.push(String::new());
    let splits = DataProcessor::new().partition(docs).expect("partition");
    assert_eq!(splits.total_len(), 12);
    assert!(splits.train.iter().chain(&splits.demo).all(|d| d.chars().count() >= 50));
}

#[test]
fn fewer_than_five_documents_all_land_in_demo() {
    let splits = DataProcessor::new().partition(long_docs(3)).expect("partition");
    assert_eq!(splits.demo.len(), 3);
    assert!(splits.train.is_empty() && splits.validation.is_empty() && splits.test.is_empty());
}

#[test]
fn partition_rejects_out_of_range_fraction() {
    let processor = DataProcessor::with_config(SplitConfig { train_fraction: 1.5, ..SplitConfig::default() });
    let err = processor.partition(long_docs(10)).expect_err("fraction > 1");
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn label_filter_keeps_target_reviews_in_order() {
    let raw = b"1,Awful,\"Broke after a day, returned it\"\n2,Great,Loved it\n1,Meh,Stopped working\n";
    let kept = filter_by_label("raw/reviews.csv", raw, 1).expect("filter");
    assert_eq!(kept, vec!["Broke after a day, returned it".to_string(), "Stopped working".to_string()]);
}

#[test]
fn label_filter_rejects_malformed_rows() {
    let err = filter_by_label("raw/reviews.csv", b"x,title,body\n", 1).expect_err("bad label");
    assert!(matches!(err, Error::Decode { .. }));
    let err = filter_by_label("raw/reviews.csv", b"1,only two\n", 1).expect_err("short row");
    assert!(err.to_string().contains("expected 3 columns"));
}

#[test]
fn documents_survive_csv_quoting() {
    let docs = vec!["plain".to_string(), "has, comma".to_string(), "has \"quotes\"\nand newline".to_string()];
    let body = write_documents(&docs).expect("write");
    assert_eq!(read_documents("k", &body).expect("read"), docs);
}

#[test]
fn fs_store_round_trips_and_lists_keys() {
    let tmp = TempDir::new().unwrap();
    let store = FsBlobStore::new(tmp.path());
    store.put("bucket", "processed/train/data_part_1.pbr", b"b").unwrap();
    store.put("bucket", "processed/train/data_part_0.pbr", b"a").unwrap();
    store.put("bucket", "processed/vocab.txt", b"v").unwrap();

    assert_eq!(store.get("bucket", "processed/train/data_part_0.pbr").unwrap(), b"a");
    assert_eq!(
        store.list("bucket", "processed/train/").unwrap(),
        vec!["processed/train/data_part_0.pbr".to_string(), "processed/train/data_part_1.pbr".to_string()]
    );
    assert_eq!(store.get("bucket", "missing.csv").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.put("bucket", "../escape", b"x").unwrap_err().kind(), ErrorKind::InvalidConfig);
}

#[test]
fn fs_store_listing_rejects_bucket_names_outside_the_root() {
    let tmp = TempDir::new().unwrap();
    let store = FsBlobStore::new(tmp.path().join("root"));
    std::fs::write(tmp.path().join("outside.txt"), b"secret").unwrap();

    for bucket in ["", "..", ".", "../x", "a/b"] {
        assert_eq!(store.list(bucket, "").unwrap_err().kind(), ErrorKind::InvalidConfig, "bucket {bucket:?}");
    }
    assert!(store.list("fresh", "").unwrap().is_empty());
}

#[test]
fn memory_store_can_reject_a_prefix() {
    let store = MemoryBlobStore::new();
    store.fail_puts_under("processed/train/");
    assert!(store.put("b", "processed/train/data_part_0.pbr", b"x").is_err());
    store.put("b", "processed/test/data_part_0.pbr", b"x").unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn config_layers_toml_and_env() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "ntmprep.toml",
            r#"
            [store]
            bucket = "my-bucket"

            [process]
            train_parts = 4
            "#,
        )?;
        jail.create_file("ntmprep.test.toml", "[prepare]\ntrain_fraction = 0.6\n")?;
        jail.set_env("RUST_ENV", "test");
        jail.set_env("APP_PREPARE__SEED", "7");

        let config = PipelineConfig::load().expect("load");
        assert_eq!(config.store.bucket, "my-bucket");
        assert_eq!(config.process.train_parts, 4);
        assert_eq!(config.process.validation_parts, 1);
        assert!((config.prepare.train_fraction - 0.6).abs() < 1e-12);
        assert_eq!(config.prepare.seed, 7);
        assert!((config.vocabulary.max_df - 0.9).abs() < 1e-12);
        Ok(())
    });
}

#[test]
fn config_validation_rejects_bad_bounds() {
    let mut config = PipelineConfig::default();
    config.vocabulary.min_df = 0.5;
    config.vocabulary.max_df = 0.1;
    assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);

    let mut config = PipelineConfig::default();
    config.process.train_parts = 0;
    assert!(config.validate().is_err());
}
