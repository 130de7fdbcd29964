//! Storage path tests
//!
//! Exercises schema enforcement, the read cache, read-only stores, multi-match
//! loads, raw paths, the memory store, deletion and hooks through `DataSource`.

#[path = "testutils/mod.rs"]
mod testutils;

use datacook::{Data, EngineError, Hooks, Table, Value};
use serde_json::json;
use testutils::test_fixture::{no_vars, vars, TestFixture};

#[test]
fn test_schema_reindexes_and_casts_tables() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    fixture.write("scores.csv", "id,score,extra\n1,2,x\n2,3.5,y\n");

    let ds = fixture.source(json!({
        "DATA": {
            "scores.csv": {
                "TYPE": "csv",
                "FIELDS": [{"id": "int"}, {"score": "float"}, {"flag": "bool"}]
            }
        }
    }));

    let data = ds.load("scores.csv", &no_vars()).expect("Failed to load scores.csv");
    let table = data.as_table().expect("csv loads as a table");
    assert_eq!(table.columns(), ["id", "score", "flag"]);
    assert_eq!(table.get(0, "id"), Some(&Value::Integer(1)));
    assert_eq!(table.get(0, "score"), Some(&Value::Float(2.0)));
    assert_eq!(table.get(1, "flag"), Some(&Value::Null));

    let written = Table::from_rows(
        ["score", "id"],
        vec![vec![Value::from("4.5"), Value::from("3")]],
    )
    .expect("Failed to build table");
    let dumped = ds
        .dump("scores.csv", Data::Table(written), &no_vars())
        .expect("Failed to dump scores.csv");
    let dumped = dumped.as_table().expect("dump returns the table");
    assert_eq!(dumped.columns(), ["id", "score", "flag"]);
    assert_eq!(dumped.get(0, "id"), Some(&Value::Integer(3)));
    assert_eq!(fixture.read("scores.csv"), "id,score,flag\n3,4.5,\n");

    let bad = Table::from_rows(["id"], vec![vec![Value::from("three")]]).expect("Failed to build table");
    let err = ds.dump("scores.csv", Data::Table(bad), &no_vars()).unwrap_err();
    assert!(matches!(err, EngineError::Schema { .. }), "got {:?}", err);
}

#[test]
fn test_cache_serves_reads_until_delete() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    fixture.write("a.json", "[1]");

    let ds = fixture
        .builder(json!({"DATA": {"a.json": {"TYPE": "json", "FIELDS": []}}}))
        .cache_in_memory(true)
        .build()
        .expect("Failed to build data source");

    let first = ds.load("a.json", &no_vars()).expect("Failed to load a.json");
    assert_eq!(first.as_json(), Some(&json!([1])));

    // Dumps do not refresh the cache
    ds.dump("a.json", Data::Json(json!([2])), &no_vars())
        .expect("Failed to dump a.json");
    let cached = ds.load("a.json", &no_vars()).expect("Failed to load a.json");
    assert_eq!(cached.as_json(), Some(&json!([1])));

    ds.clear_memory_cache();
    let fresh = ds.load("a.json", &no_vars()).expect("Failed to load a.json");
    assert_eq!(fresh.as_json(), Some(&json!([2])));

    ds.delete("a.json", &no_vars()).expect("Failed to delete a.json");
    assert!(!fixture.path("a.json").exists());
    let err = ds.load_existing("a.json", &no_vars()).unwrap_err();
    assert!(matches!(err, EngineError::BackendIo(_)), "got {:?}", err);
}

#[test]
fn test_stream_store_is_read_only() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    fixture.write("events.jsonl", "[\"id\",\"kind\"]\n[1,\"a\"]\n[2,\"b\"]\n");

    let ds = fixture.source(json!({
        "DATA": {
            "events.jsonl": {"TYPE": "jsonl_stream", "FIELDS": [{"id": "int"}, {"kind": "str"}]}
        }
    }));

    let events = ds.load("events.jsonl", &no_vars()).expect("Failed to load stream");
    let table = events.as_table().expect("streams load as tables");
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.get(1, "kind"), Some(&Value::from("b")));

    match ds.dump("events.jsonl", events, &no_vars()) {
        Err(EngineError::UnsupportedBackendOperation { store, operation }) => {
            assert_eq!(store, "jsonl_stream");
            assert_eq!(operation, "dump");
        }
        other => panic!("Expected UnsupportedBackendOperation, got {:?}", other),
    }
}

#[test]
fn test_unbound_slots_load_every_match() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    fixture.write("logs/tue.json", "{\"n\": 2}");
    fixture.write("logs/mon.json", "{\"n\": 1}");
    fixture.write("logs/notes.txt", "ignored");

    let ds = fixture.source(json!({
        "DATA": {"logs/{day}.json": {"TYPE": "json", "FREE_FIELDS": true, "FIELDS": []}}
    }));

    assert!(ds.exists("logs/{day}.json", &no_vars()).expect("exists failed"));
    let all = ds.load("logs/{day}.json", &no_vars()).expect("Failed to load logs");
    let items = all.as_collection().expect("unbound loads are collections");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_json(), Some(&json!({"n": 1})));
    assert_eq!(items[1].as_json(), Some(&json!({"n": 2})));

    let one = ds
        .load("logs/{day}.json", &vars(&[("day", "tue")]))
        .expect("Failed to load tue");
    assert_eq!(one.as_json(), Some(&json!({"n": 2})));

    match ds.dump("logs/{day}.json", Data::Json(json!({})), &no_vars()) {
        Err(EngineError::TargetNotMaterializable { path, slots }) => {
            assert_eq!(path, "logs/{day}.json");
            assert_eq!(slots, vec!["day"]);
        }
        other => panic!("Expected TargetNotMaterializable, got {:?}", other),
    }
}

#[test]
fn test_raw_paths_use_extension_store() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    let ds = fixture.source(json!([]));

    ds.dump("tmp/scratch.json", Data::Json(json!({"ok": true})), &no_vars())
        .expect("Failed to dump scratch file");
    let loaded = ds
        .load_existing("tmp/scratch.json", &no_vars())
        .expect("Failed to load scratch file");
    assert_eq!(loaded.as_json(), Some(&json!({"ok": true})));

    let err = ds.load("unknown/thing", &no_vars()).unwrap_err();
    assert!(matches!(err, EngineError::PatternMismatch(_)), "got {:?}", err);
}

#[test]
fn test_memory_store_lists_matches() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    let ds = fixture.source(json!({
        "DATA": {"mem/{key}": {"TYPE": "memory", "FIELDS": []}}
    }));

    for key in ["y", "x"] {
        ds.dump("mem/{key}", Data::Json(json!(key)), &vars(&[("key", key)]))
            .expect("Failed to dump to memory");
    }
    assert!(!fixture.path("mem/x").exists());

    let all = ds.load("mem/{key}", &no_vars()).expect("Failed to load memory entries");
    let items = all.as_collection().expect("unbound loads are collections");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_json(), Some(&json!("x")));

    ds.delete("mem/{key}", &vars(&[("key", "x")]))
        .expect("Failed to delete memory entry");
    assert!(!ds.exists("mem/x", &no_vars()).expect("exists failed"));
    assert!(ds.exists("mem/y", &no_vars()).expect("exists failed"));
}

#[test]
fn test_delete_removes_directories() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    fixture.write("parts/p1.csv", "id\n1\n");
    fixture.write("parts/p2.csv", "id\n2\n");

    let ds = fixture.source(json!({
        "DATA": {"parts": {"TYPE": "csv", "FIELDS": ["id"]}}
    }));

    ds.delete("parts", &no_vars()).expect("Failed to delete directory");
    assert!(!fixture.path("parts").exists());

    // Absent datasets are a no-op
    ds.delete("parts", &no_vars()).expect("Deleting twice should succeed");
}

#[test]
fn test_hooks_transform_loads_and_dumps() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    fixture.write("raw.json", "[3, 1, 2]");

    let mut hooks = Hooks::new();
    hooks.on_load("raw.json", |data| {
        let mut values: Vec<i64> = data
            .as_json()
            .and_then(|v| v.as_array())
            .ok_or("expected an array")?
            .iter()
            .filter_map(|v| v.as_i64())
            .collect();
        values.sort();
        Ok(Data::Json(json!(values)))
    });
    hooks.on_dump("out.json", |_| Ok(Data::Json(json!("redacted"))));

    let ds = fixture
        .builder(json!({
            "DEFAULTS": {"TYPE": "json", "FREE_FIELDS": true},
            "DATA": {"raw.json": {"FIELDS": []}, "out.json": {"FIELDS": []}}
        }))
        .hooks(hooks)
        .build()
        .expect("Failed to build data source");

    let raw = ds.load("raw.json", &no_vars()).expect("Failed to load raw.json");
    assert_eq!(raw.as_json(), Some(&json!([1, 2, 3])));

    let returned = ds
        .dump("out.json", Data::Json(json!({"secret": 1})), &no_vars())
        .expect("Failed to dump out.json");
    assert_eq!(returned.as_json(), Some(&json!({"secret": 1})));
    assert_eq!(fixture.read("out.json"), "\"redacted\"");
}
