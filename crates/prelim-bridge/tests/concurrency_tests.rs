use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use prelim_bridge::Bridge;
use prelim_core::config::{BridgeConfig, RootChannel};
use prelim_core::record::ResultRecord;
use prelim_core::types::{CallArgs, SearchStatus};
use prelim_engine::{get_default_engine, hit, EnvRootEngine, Script, ScriptedEngine};
use tempfile::TempDir;

const WORKERS: usize = 8;

fn scripted_per_database() -> ScriptedEngine {
    let mut engine = ScriptedEngine::new(Script::no_hits()).with_delay(Duration::from_millis(15));
    for i in 0..WORKERS {
        let oid = i32::try_from(i).unwrap();
        engine = engine.on(&format!("db{i}"), Script::batches(vec![vec![hit(oid, 10, (0, 1), (0, 1))]]));
    }
    engine
}

/// Runs one invocation per worker, all released at once, each with its own
/// database and root. Returns the parsed records per worker.
fn run_partitions(bridge: Arc<Bridge>) -> Vec<Vec<ResultRecord>> {
    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let bridge = Arc::clone(&bridge);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let args = CallArgs::new(&format!("job{i}"), "ACGT", &format!("db{i}"), "")
                    .with_chunk(&format!("c{i}"))
                    .with_db_root(&format!("/roots/{i}"));
                barrier.wait();
                let lines = bridge.prelim_search(args).expect("search");
                lines.iter().map(|l| ResultRecord::parse_line(l).expect("parse")).collect::<Vec<_>>()
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().expect("worker")).collect()
}

fn assert_each_saw_its_own(engine: &ScriptedEngine, results: &[Vec<ResultRecord>]) {
    let calls = engine.calls();
    assert_eq!(calls.len(), WORKERS);
    for call in calls {
        let i: usize = call.database_path.trim_start_matches("db").parse().unwrap();
        assert_eq!(call.db_root, Some(PathBuf::from(format!("/roots/{i}"))), "{call:?}");
    }
    for (i, records) in results.iter().enumerate() {
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_id, i32::try_from(i).unwrap());
        assert_eq!(records[0].chunk, format!("c{i}"));
        assert_eq!(records[0].job_id, format!("job{i}"));
    }
}

#[test]
fn parameter_channel_keeps_roots_call_scoped() {
    let engine = Arc::new(scripted_per_database());
    let bridge = Arc::new(Bridge::new(Box::new(Arc::clone(&engine)), &BridgeConfig::default()));
    let results = run_partitions(bridge);
    assert_each_saw_its_own(&engine, &results);
    assert_eq!(engine.counters().released(), WORKERS);
}

#[test]
fn process_env_channel_is_serialized_and_restored() {
    let var = "PRELIM_TEST_ENV_CHANNEL_ROOT";
    std::env::remove_var(var);

    let engine = Arc::new(EnvRootEngine::new(scripted_per_database(), var));
    let mut config = BridgeConfig::default();
    config.engine.root_channel = RootChannel::ProcessEnv(var.to_string());
    let bridge = Arc::new(Bridge::new(Box::new(Arc::clone(&engine)), &config));

    let results = run_partitions(bridge);

    assert_eq!(engine.races(), 0, "root changed underneath a running search");
    assert_each_saw_its_own(engine.inner(), &results);
    assert_eq!(engine.inner().counters().released(), WORKERS);
    assert!(std::env::var_os(var).is_none(), "previous (absent) value restored");
}

#[test]
fn process_env_channel_restores_previous_value() {
    let var = "PRELIM_TEST_ENV_CHANNEL_PREVIOUS";
    std::env::set_var(var, "/original/root");

    let engine = Arc::new(EnvRootEngine::new(ScriptedEngine::new(Script::Unavailable), var));
    let mut config = BridgeConfig::default();
    config.engine.root_channel = RootChannel::ProcessEnv(var.to_string());
    let bridge = Bridge::new(Box::new(Arc::clone(&engine)), &config);

    let lines = bridge.prelim_search(CallArgs::new("j", "ACGT", "db", "").with_chunk("c").with_db_root("/call/root")).unwrap();

    assert_eq!(lines.len(), 1);
    assert_eq!(engine.inner().calls()[0].db_root, Some(PathBuf::from("/call/root")));
    assert_eq!(std::env::var(var).unwrap(), "/original/root");
}

#[test]
fn fixture_engine_finds_the_call_root_on_either_channel() {
    let var = "PRELIM_TEST_FIXTURE_CHANNEL_ROOT";
    std::env::remove_var(var);
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("nt.07.hits.jsonl"),
        r#"[{"object_id":12,"score":80,"query_start":0,"query_end":40,"subject_start":300,"subject_end":340}]"#,
    )
    .unwrap();
    let args = CallArgs::new("j", "ACGT", "nt.07", "").with_chunk("c").with_db_root(&tmp.path().display().to_string());

    for channel in [RootChannel::Parameter, RootChannel::ProcessEnv(var.to_string())] {
        let mut config = BridgeConfig::default();
        config.engine.root_channel = channel.clone();
        let bridge = Bridge::new(get_default_engine(&channel), &config);
        let outcome = bridge.search(args.clone()).unwrap();
        assert_eq!(outcome.status, SearchStatus::Hits { count: 1 }, "{channel:?}");
        assert_eq!(ResultRecord::parse_line(&outcome.response[0]).unwrap().object_id, 12);
    }
    assert!(std::env::var_os(var).is_none());
}
