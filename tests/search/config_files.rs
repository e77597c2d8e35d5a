//! Configuration and translation files on disk.

use std::sync::Arc;

use recdex::{
    Locale, MemoryStore, Recdex, RecdexError, SearchConfig, SearchSpec, TranslationTable,
};
use tempfile::TempDir;

use crate::common::{ski, ski_schema};

#[test]
fn test_facade_from_files() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("recdex.toml");
    std::fs::write(
        &config_path,
        "min_prefix_len = 2\nlocales = [\"de\"]\ndefault_page_size = 10\n",
    )
    .unwrap();
    let labels_path = dir.path().join("labels.toml");
    std::fs::write(
        &labels_path,
        "[labels.ski_alpine]\nen = \"Alpine ski\"\nde = \"Alpinski\"\n",
    )
    .unwrap();

    let config = SearchConfig::from_file(&config_path).unwrap();
    let table = TranslationTable::from_file(&labels_path).unwrap();
    let recdex = Recdex::new(
        Arc::new(MemoryStore::new()),
        ski_schema(),
        Arc::new(table),
        config,
    )
    .unwrap();

    let stored = recdex.create(ski("s1", "SL1", "Salomon", 1)).unwrap();
    assert!(stored.has_keyword(Locale::De, "sa"));
    assert!(stored.keywords(Locale::En).is_none());

    let page = recdex
        .query(&SearchSpec::new("team", Locale::De).term("al"))
        .unwrap();
    assert_eq!(page.records.len(), 1);
}

#[test]
fn test_default_config_written_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recdex.toml");
    SearchConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(SearchConfig::from_file(&path).unwrap(), SearchConfig::default());
}

#[test]
fn test_invalid_config_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recdex.toml");
    std::fs::write(&path, "max_page_size = 10\ndefault_page_size = 20\n").unwrap();
    assert!(matches!(
        SearchConfig::from_file(&path),
        Err(RecdexError::Config { .. })
    ));
}
