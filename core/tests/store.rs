//! Record store: loading, lookup, and tract-based neighbours.

use equity_core::{
    error::EquityError,
    record::BlockGroupRecord,
    store::{DatasetCache, RecordStore},
};
use std::sync::Arc;
use std::thread;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/block_groups.json");

fn fixture() -> RecordStore {
    let _ = env_logger::builder().is_test(true).try_init();
    RecordStore::load(FIXTURE).expect("fixture loads")
}

fn record(geoid: &str) -> BlockGroupRecord {
    BlockGroupRecord {
        geoid:               geoid.to_string(),
        name:                String::new(),
        equity_score:        50.0,
        gentrification_risk: 50.0,
        foreclosure_risk:    50.0,
        median_income:       0.0,
        median_price:        0.0,
        population:          100,
        days_on_market:      30,
        price_yoy_change:    0.0,
    }
}

#[test]
fn fixture_loads_in_file_order() {
    let store = fixture();
    assert_eq!(store.len(), 9);
    assert_eq!(store.records()[0].geoid, "260650001001");
    assert_eq!(store.records()[8].geoid, "260650003001");
}

#[test]
fn find_by_geoid_hits_and_misses() {
    let store = fixture();
    let hit = store.find_by_geoid("260650001004").expect("present");
    assert_eq!(hit.equity_score, 90.0);
    assert!(store.find_by_geoid("260650099999").is_none());
}

#[test]
fn require_names_the_missing_geoid() {
    let store = fixture();
    match store.require("260650099999") {
        Err(EquityError::NotFound { geoids }) => assert_eq!(geoids, vec!["260650099999"]),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn neighbors_share_tract_and_exclude_self() {
    let store = fixture();
    let neighbors = store.neighbors_of("260650001001", 4);
    let ids: Vec<&str> = neighbors.iter().map(|r| r.geoid.as_str()).collect();
    assert_eq!(ids, vec!["260650001002", "260650001003", "260650001004", "260650001005"]);
}

#[test]
fn neighbors_respect_limit_and_isolated_tracts() {
    let store = fixture();
    assert_eq!(store.neighbors_of("260650001001", 10).len(), 5);
    assert_eq!(store.neighbors_of("260650001001", 0).len(), 0);
    assert!(store.neighbors_of("260650003001", 4).is_empty());

    let ids: Vec<&str> = store
        .neighbors_of("260650002001", 4)
        .iter()
        .map(|r| r.geoid.as_str())
        .collect();
    assert_eq!(ids, vec!["260650002002"]);
}

#[test]
fn neighbors_of_unknown_geoid_still_uses_its_tract() {
    let store = fixture();
    let neighbors = store.neighbors_of("260650002009", 4);
    assert_eq!(neighbors.len(), 2);
}

#[test]
fn duplicate_geoids_are_rejected() {
    let err = RecordStore::from_records(vec![record("260650001001"), record("260650001001")])
        .unwrap_err();
    assert!(matches!(err, EquityError::Load { .. }), "got {err:?}");
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn malformed_geoids_are_rejected() {
    for bad in ["26065000100", "2606500010011", "26065000100a"] {
        let err = RecordStore::from_records(vec![record(bad)]).unwrap_err();
        assert!(err.to_string().contains(bad), "error should name {bad}: {err}");
    }
}

#[test]
fn non_finite_values_are_rejected() {
    let mut nan_score = record("260650001001");
    nan_score.gentrification_risk = f64::NAN;
    let err = RecordStore::from_records(vec![nan_score]).unwrap_err();
    assert!(matches!(err, EquityError::Load { .. }), "got {err:?}");
    assert!(err.to_string().contains("gentrification_risk"), "{err}");

    let mut infinite_price = record("260650001002");
    infinite_price.median_price = f64::INFINITY;
    let err = RecordStore::from_records(vec![infinite_price]).unwrap_err();
    assert!(err.to_string().contains("median_price"), "{err}");
}

#[test]
fn missing_file_is_a_load_error() {
    let err = RecordStore::load("/definitely/not/here.json").unwrap_err();
    match err {
        EquityError::Load { path, .. } => assert!(path.contains("not/here.json")),
        other => panic!("expected Load, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_load_error() {
    let dir = std::env::temp_dir().join(format!("equity-core-malformed-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.json");
    std::fs::write(&path, "[{\"geoid\": \"260650001001\"").unwrap();

    let err = RecordStore::load(&path).unwrap_err();
    assert!(matches!(err, EquityError::Load { .. }), "got {err:?}");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn cache_loads_once_and_shares_the_store() {
    let cache = Arc::new(DatasetCache::new(FIXTURE));
    assert!(!cache.is_loaded());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get().expect("load"))
        })
        .collect();
    let stores: Vec<Arc<RecordStore>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(cache.is_loaded());
    for store in &stores[1..] {
        assert!(Arc::ptr_eq(&stores[0], store), "Concurrent callers got different stores");
    }
}

#[test]
fn cache_does_not_remember_failures() {
    let cache = DatasetCache::new("/definitely/not/here.json");
    assert!(cache.get().is_err());
    assert!(!cache.is_loaded());
    assert!(cache.get().is_err());
}

#[test]
fn preloaded_cache_skips_the_file_system() {
    let cache = DatasetCache::preloaded(fixture());
    assert!(cache.is_loaded());
    assert_eq!(cache.get().unwrap().len(), 9);
}
