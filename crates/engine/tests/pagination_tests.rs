//! Cursor Pagination Tests
//!
//! Walks complete result streams page by page and checks that every
//! matching record shows up exactly once, in request order.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use recdex_core::{Document, Locale, RangeFilter, RecdexError, SortDirection, Value, ID_FIELD};
use recdex_engine::search::{
    Cursor, IndexSchema, IndexWriter, KeywordBuilder, Paginator, QueryPlanner, SearchSpec,
    TranslationTable,
};
use recdex_storage::MemoryStore;

fn setup() -> (Arc<MemoryStore>, IndexWriter, Paginator) {
    let store = Arc::new(MemoryStore::new());
    let builder = KeywordBuilder::new(
        Arc::new(IndexSchema::new().text("name").text("brand")),
        Arc::new(TranslationTable::new()),
        3,
    );
    let writer = IndexWriter::new(store.clone(), builder, Locale::ALL.to_vec());
    let paginator = Paginator::new(store.clone(), QueryPlanner::new(3, 25, 500));
    (store, writer, paginator)
}

/// Every visible record of the stream, following cursors to the end
fn drain(paginator: &Paginator, spec: &SearchSpec) -> Vec<Document> {
    let mut page = paginator.query(spec).unwrap();
    let mut all = page.records.clone();
    let mut pages = 1;
    while let Some(cursor) = page.cursor.clone() {
        page = paginator.load_more(&cursor, spec).unwrap();
        all.extend(page.records.iter().cloned());
        pages += 1;
        assert!(pages < 10_000, "pagination does not terminate");
    }
    assert!(page.exhausted);
    all
}

fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter().map(|d| d.id.as_str().to_string()).collect()
}

// ============================================================================
// Reference Scenario
// ============================================================================

#[test]
fn test_five_records_page_size_two() {
    let (_, writer, paginator) = setup();
    for id in ["A", "B", "C", "D", "E"] {
        writer
            .create(Document::new("team", id).with_field("name", "Ski"))
            .unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En).page_size(2);

    let p1 = paginator.query(&spec).unwrap();
    assert_eq!(ids(&p1.records), vec!["A", "B"]);
    assert!(!p1.exhausted);

    let p2 = paginator.load_more(p1.cursor.as_ref().unwrap(), &spec).unwrap();
    assert_eq!(ids(&p2.records), vec!["C", "D"]);
    assert!(!p2.exhausted);

    let p3 = paginator.load_more(p2.cursor.as_ref().unwrap(), &spec).unwrap();
    assert_eq!(ids(&p3.records), vec!["E"]);
    assert!(p3.exhausted);
    assert!(p3.cursor.is_none());
}

#[test]
fn test_prefix_search_finds_record() {
    let (_, writer, paginator) = setup();
    writer
        .create(
            Document::new("team", "r1")
                .with_field("name", "SL240192")
                .with_field("brand", "Salomon"),
        )
        .unwrap();
    writer
        .create(Document::new("team", "r2").with_field("brand", "Atomic"))
        .unwrap();

    for term in ["SL24", "sl240192", "Salo", "salomon"] {
        let page = paginator
            .query(&SearchSpec::new("team", Locale::En).term(term))
            .unwrap();
        assert_eq!(ids(&page.records), vec!["r1"], "term {:?}", term);
    }

    // a two-character term lists everything instead of matching nothing
    let page = paginator
        .query(&SearchSpec::new("team", Locale::En).term("sl"))
        .unwrap();
    assert_eq!(page.records.len(), 2);

    // infix matches are not prefix matches
    let page = paginator
        .query(&SearchSpec::new("team", Locale::En).term("lomon"))
        .unwrap();
    assert!(page.records.is_empty());
}

#[test]
fn test_scopes_are_isolated() {
    let (_, writer, paginator) = setup();
    writer
        .create(Document::new("team-a", "1").with_field("brand", "Salomon"))
        .unwrap();
    writer
        .create(Document::new("team-b", "2").with_field("brand", "Salomon"))
        .unwrap();
    let page = paginator
        .query(&SearchSpec::new("team-a", Locale::En).term("salomon"))
        .unwrap();
    assert_eq!(ids(&page.records), vec!["1"]);
}

#[test]
fn test_descending_sort_with_ties() {
    let (_, writer, paginator) = setup();
    for (id, price) in [("a", 10), ("b", 20), ("c", 20), ("d", 30), ("e", 10)] {
        writer
            .create(
                Document::new("team", id)
                    .with_field("name", "Binding")
                    .with_field("price", price),
            )
            .unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En)
        .term("bind")
        .sort_by("price", SortDirection::Descending)
        .page_size(2);
    assert_eq!(ids(&drain(&paginator, &spec)), vec!["d", "c", "b", "e", "a"]);
}

#[test]
fn test_load_more_with_token_round_trip() {
    let (_, writer, paginator) = setup();
    for i in 0..5 {
        writer
            .create(Document::new("team", format!("r{}", i).as_str()).with_field("price", i as f64 * 1.5))
            .unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En)
        .sort_by("price", SortDirection::Ascending)
        .page_size(2);
    let first = paginator.query(&spec).unwrap();
    let token = first.cursor.as_ref().unwrap().encode().unwrap();

    let cursor = Cursor::decode(&token).unwrap();
    let second = paginator.load_more(&cursor, &spec).unwrap();
    assert_eq!(ids(&second.records), vec!["r2", "r3"]);
}

#[test]
fn test_token_paging_over_non_finite_sort_keys() {
    let (_, writer, paginator) = setup();
    for (id, price) in [
        ("hi", f64::INFINITY),
        ("lo", f64::NEG_INFINITY),
        ("mid", 1.0),
        ("nan", f64::NAN),
    ] {
        writer
            .create(Document::new("team", id).with_field("price", price))
            .unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En)
        .sort_by("price", SortDirection::Ascending)
        .page_size(1);

    let mut page = paginator.query(&spec).unwrap();
    let mut seen = ids(&page.records);
    while let Some(cursor) = &page.cursor {
        let token = cursor.encode().unwrap();
        page = paginator.load_more(&Cursor::decode(&token).unwrap(), &spec).unwrap();
        seen.extend(ids(&page.records));
        assert!(seen.len() <= 4, "records repeated: {:?}", seen);
    }
    assert_eq!(seen.len(), 4);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 4);
    assert_eq!(&seen[..3], &["lo", "mid", "hi"]);
}

#[test]
fn test_cursor_rejected_after_request_change() {
    let (_, writer, paginator) = setup();
    for id in ["a", "b", "c"] {
        writer
            .create(Document::new("team", id).with_field("name", "Salomon"))
            .unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En).term("sal").page_size(1);
    let first = paginator.query(&spec).unwrap();
    let cursor = first.cursor.unwrap();

    let changed = [
        spec.clone().term("salo"),
        SearchSpec::new("team", Locale::De).term("sal").page_size(1),
        spec.clone().filter_eq("status", "active"),
        spec.clone().sort_by(ID_FIELD, SortDirection::Descending),
    ];
    for other in changed {
        let err = paginator.load_more(&cursor, &other).unwrap_err();
        assert!(matches!(err, RecdexError::CursorMismatch { .. }));
        assert!(err.requires_restart());
    }
}

#[test]
fn test_deferred_range_keeps_streaming() {
    let (_, writer, paginator) = setup();
    for i in 0..12 {
        writer
            .create(
                Document::new("team", format!("r{:02}", i).as_str())
                    .with_field("name", "Pole")
                    .with_field("length", 100 + i * 10),
            )
            .unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En)
        .term("pole")
        .range(RangeFilter::new("length").at_least(190.0))
        .page_size(4);

    let first = paginator.query(&spec).unwrap();
    assert_eq!(first.fetched, 4);
    assert!(first.records.is_empty());
    assert!(!first.exhausted);

    assert_eq!(ids(&drain(&paginator, &spec)), vec!["r09", "r10", "r11"]);
}

#[test]
fn test_records_written_between_pages() {
    let (store, writer, paginator) = setup();
    for id in ["a", "c", "e"] {
        writer.create(Document::new("team", id)).unwrap();
    }
    let spec = SearchSpec::new("team", Locale::En).page_size(2);
    let first = paginator.query(&spec).unwrap();
    assert_eq!(ids(&first.records), vec!["a", "c"]);

    // behind the cursor: not revisited; ahead of it: picked up
    writer.create(Document::new("team", "b")).unwrap();
    writer.create(Document::new("team", "d")).unwrap();
    assert_eq!(store.len(), 5);

    let second = paginator.load_more(first.cursor.as_ref().unwrap(), &spec).unwrap();
    assert_eq!(ids(&second.records), vec!["d", "e"]);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_pagination_is_complete_and_ordered(
        prices in proptest::collection::vec(0i64..20, 0..40),
        page_size in 1usize..7,
        descending in any::<bool>(),
        with_term in any::<bool>(),
    ) {
        let (store, writer, paginator) = setup();
        for (i, price) in prices.iter().enumerate() {
            let name = if i % 3 == 0 { "Atomic" } else { "Salomon" };
            writer
                .create(
                    Document::new("team", format!("r{:03}", i).as_str())
                        .with_field("brand", name)
                        .with_field("price", *price),
                )
                .unwrap();
        }
        let direction = if descending { SortDirection::Descending } else { SortDirection::Ascending };
        let mut spec = SearchSpec::new("team", Locale::En)
            .sort_by("price", direction)
            .page_size(page_size);
        if with_term {
            spec = spec.term("salo");
        }

        let got = drain(&paginator, &spec);

        let unique: HashSet<_> = got.iter().map(|d| d.id.clone()).collect();
        prop_assert_eq!(unique.len(), got.len());

        let expected = prices
            .iter()
            .enumerate()
            .filter(|(i, _)| !with_term || i % 3 != 0)
            .count();
        prop_assert_eq!(got.len(), expected);
        prop_assert_eq!(store.len(), prices.len());

        for pair in got.windows(2) {
            let a = pair[0].get("price").cloned().unwrap_or(Value::Null);
            let b = pair[1].get("price").cloned().unwrap_or(Value::Null);
            let ord = a.sort_cmp(&b).then_with(|| pair[0].id.cmp(&pair[1].id));
            prop_assert_eq!(direction.apply(ord), std::cmp::Ordering::Less);
        }
    }
}
