//! Shared fixtures for the facade test suite.

#![allow(dead_code)]

use std::sync::Arc;

use recdex::{
    Document, IndexSchema, Locale, ManualClock, MemoryStore, Recdex, SearchConfig,
    TranslationTable,
};

/// Schema of the ski inventory used throughout the suite
pub fn ski_schema() -> IndexSchema {
    IndexSchema::new()
        .text("serialNumber")
        .text("brand")
        .enumeration("category")
        .child("accessories", IndexSchema::new().text("name").enumeration("kind"))
}

/// Labels for the categories and accessory kinds in [`ski`]
pub fn ski_translations() -> TranslationTable {
    TranslationTable::new()
        .with_label("ski_alpine", Locale::En, "Alpine ski")
        .with_label("ski_alpine", Locale::De, "Alpinski")
        .with_label("binding", Locale::En, "Binding")
        .with_label("binding", Locale::De, "Bindung")
}

/// Facade over a fresh store with a manual clock
pub fn recdex_with(config: SearchConfig) -> (Recdex, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let recdex = Recdex::with_clock(
        store.clone(),
        ski_schema(),
        Arc::new(ski_translations()),
        config,
        clock.clone(),
    )
    .unwrap();
    (recdex, store, clock)
}

/// Facade with default configuration
pub fn recdex() -> (Recdex, Arc<MemoryStore>, Arc<ManualClock>) {
    recdex_with(SearchConfig::default())
}

/// One ski record in scope `team`
pub fn ski(id: &str, serial: &str, brand: &str, price: i64) -> Document {
    Document::new("team", id)
        .with_field("serialNumber", serial)
        .with_field("brand", brand)
        .with_field("category", "ski_alpine")
        .with_field("price", price)
}

/// Ids of a record slice
pub fn ids(records: &[Document]) -> Vec<String> {
    records.iter().map(|d| d.id.as_str().to_string()).collect()
}
