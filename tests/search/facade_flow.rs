//! Write, search, page and reindex through the facade.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use recdex::{
    Document, DocumentStore, Locale, ManualClock, MemoryStore, RangeFilter, Recdex, RecdexError,
    RecdexResult, RecordId, ScopeId, SearchConfig, SearchSpec, SortDirection, StoreQuery,
    TranslationTable, Value, WriteOp,
};

use crate::common::{ids, recdex, recdex_with, ski, ski_schema, ski_translations};

fn accessory(name: &str, kind: &str) -> Value {
    let mut m = BTreeMap::new();
    m.insert("name".to_string(), Value::from(name));
    m.insert("kind".to_string(), Value::from(kind));
    Value::Object(m)
}

#[test]
fn test_search_by_serial_brand_and_category() {
    let (recdex, _, _) = recdex();
    recdex.create(ski("s1", "SL240192", "Salomon", 499)).unwrap();
    recdex.create(ski("s2", "AT1000", "Atomic", 399)).unwrap();

    let search = |locale, term: &str| {
        ids(&recdex
            .query(&SearchSpec::new("team", locale).term(term))
            .unwrap()
            .records)
    };
    assert_eq!(search(Locale::En, "sl24"), vec!["s1"]);
    assert_eq!(search(Locale::En, "ATOM"), vec!["s2"]);
    assert_eq!(search(Locale::De, "alpinski"), vec!["s1", "s2"]);
    assert!(search(Locale::En, "alpinski").is_empty());
    assert_eq!(search(Locale::En, "alpine"), vec!["s1", "s2"]);
}

#[test]
fn test_child_records_searchable_per_locale() {
    let (recdex, _, _) = recdex();
    recdex
        .create(ski("s1", "SL1", "Salomon", 1).with_field(
            "accessories",
            Value::Array(vec![accessory("Warden 13", "binding")]),
        ))
        .unwrap();

    let de = recdex
        .query(&SearchSpec::new("team", Locale::De).term("bindung"))
        .unwrap();
    assert_eq!(ids(&de.records), vec!["s1"]);
    let en = recdex
        .query(&SearchSpec::new("team", Locale::En).term("warden"))
        .unwrap();
    assert_eq!(ids(&en.records), vec!["s1"]);
}

#[test]
fn test_update_replaces_keywords() {
    let (recdex, store, _) = recdex();
    recdex.create(ski("s1", "SL1", "Salomon", 1)).unwrap();
    recdex.update(ski("s1", "SL1", "Head", 1)).unwrap();

    let old = recdex
        .query(&SearchSpec::new("team", Locale::En).term("salomon"))
        .unwrap();
    assert!(old.records.is_empty());

    let stored = store
        .get(&ScopeId::new("team"), &RecordId::new("s1"))
        .unwrap()
        .unwrap();
    assert!(stored.has_keyword(Locale::De, "head"));
    assert!(!stored.has_keyword(Locale::De, "salomon"));
}

#[test]
fn test_delete_removes_from_results() {
    let (recdex, _, _) = recdex();
    recdex.create(ski("s1", "SL1", "Salomon", 1)).unwrap();
    let spec = SearchSpec::new("team", Locale::En).term("salo");
    assert_eq!(recdex.query(&spec).unwrap().records.len(), 1);

    recdex
        .delete(&ScopeId::new("team"), &RecordId::new("s1"))
        .unwrap();
    assert!(recdex.query(&spec).unwrap().records.is_empty());

    let err = recdex
        .delete(&ScopeId::new("team"), &RecordId::new("s1"))
        .unwrap_err();
    assert!(matches!(err, RecdexError::NotFound { .. }));
}

#[test]
fn test_paging_with_tokens_and_price_range() {
    let (recdex, _, _) = recdex();
    for i in 0..9 {
        recdex
            .create(ski(&format!("s{}", i), &format!("SL{}", i), "Salomon", 100 * i))
            .unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En)
        .sort_by("price", SortDirection::Descending)
        .range(RangeFilter::new("price").at_most(500.0))
        .page_size(2);

    let mut page = recdex.query(&spec).unwrap();
    let mut seen = ids(&page.records);
    while let Some(cursor) = &page.cursor {
        let token = cursor.encode().unwrap();
        page = recdex.load_more_token(&token, &spec).unwrap();
        seen.extend(ids(&page.records));
    }
    assert_eq!(seen, vec!["s5", "s4", "s3", "s2", "s1", "s0"]);
}

#[test]
fn test_garbage_token_requires_restart() {
    let (recdex, _, _) = recdex();
    let err = recdex
        .load_more_token("not-a-cursor!", &SearchSpec::new("team", Locale::En))
        .unwrap_err();
    assert!(err.requires_restart());
}

#[test]
fn test_page_size_limits() {
    let mut config = SearchConfig::default();
    config.max_page_size = 10;
    config.default_page_size = 5;
    let (recdex, _, _) = recdex_with(config);
    for bad in [0, 11] {
        let err = recdex
            .query(&SearchSpec::new("team", Locale::En).page_size(bad))
            .unwrap_err();
        assert!(matches!(err, RecdexError::InvalidInput { .. }));
    }
}

#[test]
fn test_reindex_after_label_change() {
    let (recdex, store, _) = recdex();
    for i in 0..12 {
        recdex
            .create(ski(&format!("s{:02}", i), "SL1", "Salomon", i))
            .unwrap();
    }

    let relabeled = ski_translations().with_label("ski_alpine", Locale::De, "Abfahrtsski");
    let mut config = SearchConfig::default();
    config.reindex_chunk_size = 5;
    let updated = Recdex::new(store.clone(), ski_schema(), Arc::new(relabeled), config).unwrap();

    let stale = updated
        .query(&SearchSpec::new("team", Locale::De).term("abfahrt"))
        .unwrap();
    assert!(stale.records.is_empty());

    let mut progress = Vec::new();
    let report = updated
        .reindex_all_with_progress(&ScopeId::new("team"), |p| progress.push((p.processed, p.total)))
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.chunks_committed, 3);
    assert_eq!(progress, vec![(5, 12), (10, 12), (12, 12)]);

    let fresh = updated
        .query(&SearchSpec::new("team", Locale::De).term("abfahrt").page_size(50))
        .unwrap();
    assert_eq!(fresh.records.len(), 12);
}

#[test]
fn test_reindex_invalidates_cached_pages() {
    let (recdex, store, _) = recdex();
    recdex.create(ski("s1", "SL1", "Salomon", 1)).unwrap();

    // record written behind the facade's back, without keywords
    store
        .write(WriteOp::Upsert(
            Document::new("team", "s2").with_field("brand", "Salomon"),
        ))
        .unwrap();

    let spec = SearchSpec::new("team", Locale::En).term("salomon");
    assert_eq!(recdex.query(&spec).unwrap().records.len(), 1);

    recdex.reindex_all(&ScopeId::new("team")).unwrap();
    assert_eq!(recdex.query(&spec).unwrap().records.len(), 2);
}

#[test]
fn test_translation_table_from_toml() {
    let table = TranslationTable::from_toml_str(
        r#"
[labels.ski_alpine]
en = "Alpine ski"
de = "Alpinski"
"#,
    )
    .unwrap();
    assert_eq!(table, ski_translations_subset());
}

fn ski_translations_subset() -> TranslationTable {
    TranslationTable::new()
        .with_label("ski_alpine", Locale::En, "Alpine ski")
        .with_label("ski_alpine", Locale::De, "Alpinski")
}

/// Store whose next query parks after reading, until the test releases it
struct GatedStore {
    inner: MemoryStore,
    armed: AtomicBool,
    entered: Barrier,
    release: Barrier,
}

impl GatedStore {
    fn new() -> Self {
        GatedStore {
            inner: MemoryStore::new(),
            armed: AtomicBool::new(false),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }
}

impl DocumentStore for GatedStore {
    fn get(&self, scope: &ScopeId, id: &RecordId) -> RecdexResult<Option<Document>> {
        self.inner.get(scope, id)
    }

    fn write(&self, op: WriteOp) -> RecdexResult<()> {
        self.inner.write(op)
    }

    fn batch_write(&self, ops: Vec<WriteOp>) -> RecdexResult<()> {
        self.inner.batch_write(ops)
    }

    fn query(&self, query: &StoreQuery) -> RecdexResult<Vec<Document>> {
        let result = self.inner.query(query);
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        result
    }

    fn count(&self, scope: &ScopeId) -> RecdexResult<usize> {
        self.inner.count(scope)
    }

    fn max_batch_size(&self) -> usize {
        self.inner.max_batch_size()
    }
}

#[test]
fn test_write_during_first_page_fetch_is_not_hidden_by_cache() {
    let store = Arc::new(GatedStore::new());
    let recdex = Recdex::with_clock(
        store.clone(),
        ski_schema(),
        Arc::new(ski_translations()),
        SearchConfig::default(),
        Arc::new(ManualClock::new(0)),
    )
    .unwrap();
    let spec = SearchSpec::new("team", Locale::En).term("salomon");

    store.armed.store(true, Ordering::SeqCst);
    thread::scope(|s| {
        let reader = s.spawn(|| recdex.query(&spec).unwrap());
        store.entered.wait();
        recdex.create(ski("s1", "SL1", "Salomon", 1)).unwrap();
        store.release.wait();
        // fetched before the create committed
        assert!(reader.join().unwrap().records.is_empty());
    });

    let page = recdex.query(&spec).unwrap();
    assert_eq!(ids(&page.records), vec!["s1"]);
    assert_eq!(recdex.cache_stats().entries, 1);
}
