use std::fs;

use prelim_core::traits::{BatchRead, EngineCall, SearchEngine};
use prelim_engine::FixtureEngine;
use tempfile::TempDir;

fn call<'a>(db: &'a str, root: &'a std::path::Path) -> EngineCall<'a> {
    EngineCall { query: "ACGT", database_path: db, parameters: "-evalue 1e-5", db_root: Some(root) }
}

#[test]
fn replays_batches_errors_and_empty_batches_in_file_order() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("nt.01.hits.jsonl"),
        concat!(
            r#"[{"object_id":4,"score":70,"query_start":0,"query_end":20,"subject_start":5,"subject_end":25}]"#, "\n",
            "\n",
            "[]\n",
            "\"error: volume truncated\"\n",
        ),
    )
    .unwrap();

    let engine = FixtureEngine::new();
    let mut stream = engine.run_preliminary_search(&call("nt.01", tmp.path())).expect("stream");
    match stream.read_next_batch() {
        BatchRead::Batch(b) => assert_eq!(b[0].object_id, 4),
        other => panic!("expected batch, got {other:?}"),
    }
    assert_eq!(stream.read_next_batch(), BatchRead::Batch(vec![]));
    assert_eq!(stream.read_next_batch(), BatchRead::Error("volume truncated".to_string()));
    assert_eq!(stream.read_next_batch(), BatchRead::Exhausted);
    stream.release();
}

#[test]
fn missing_fixture_is_a_null_handle() {
    let tmp = TempDir::new().unwrap();
    assert!(FixtureEngine::new().run_preliminary_search(&call("absent", tmp.path())).is_none());
}

#[test]
fn malformed_fixture_is_a_null_handle() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.hits.jsonl"), "{not json}\n").unwrap();
    assert!(FixtureEngine::new().run_preliminary_search(&call("bad", tmp.path())).is_none());
}
