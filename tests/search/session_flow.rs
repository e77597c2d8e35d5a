//! Search-as-you-type: a session following a changing term.

use recdex::{Locale, RangeFilter, SearchConfig, SearchSession, SearchSpec};

use crate::common::{ids, recdex, recdex_with, ski};

#[test]
fn test_typing_discards_stale_responses() {
    let (recdex, _, _) = recdex();
    recdex.create(ski("s1", "SL1", "Salomon", 1)).unwrap();
    recdex.create(ski("s2", "SA2", "Salewa", 1)).unwrap();

    let mut session = SearchSession::new();
    let typed = SearchSpec::new("team", Locale::En).term("sal");
    assert!(session.begin(&typed).unwrap());
    let slow = recdex.query(&typed).unwrap();

    let refined = SearchSpec::new("team", Locale::En).term("salo");
    assert!(session.begin(&refined).unwrap());
    let fast = recdex.query(&refined).unwrap();

    assert!(session.apply(fast));
    assert!(!session.apply(slow));
    assert_eq!(ids(session.records()), vec!["s1"]);
    assert!(session.is_exhausted());
}

#[test]
fn test_backfill_short_pages() {
    let mut config = SearchConfig::default();
    config.default_page_size = 3;
    let (recdex, _, _) = recdex_with(config);
    for i in 0..10 {
        recdex
            .create(ski(&format!("s{:02}", i), "SL", "Salomon", i * 10))
            .unwrap();
    }
    // the range is not on the sort field, so it is checked client-side
    let spec = SearchSpec::new("team", Locale::En)
        .term("salomon")
        .range(RangeFilter::new("price").at_least(70.0));

    let mut session = SearchSession::new();
    session.begin(&spec).unwrap();
    session.apply(recdex.query(&spec).unwrap());
    assert!(session.records().is_empty());

    let mut fetches = 1;
    while session.needs_backfill(3) {
        let cursor = session.next_cursor().cloned().unwrap();
        session.apply(recdex.load_more(&cursor, &spec).unwrap());
        fetches += 1;
    }
    assert_eq!(ids(session.records()), vec!["s07", "s08", "s09"]);
    assert_eq!(fetches, 4);
}
