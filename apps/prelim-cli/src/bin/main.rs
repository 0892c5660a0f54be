use std::env;
use std::path::PathBuf;

use prelim_bridge::{init_tracing, Bridge};
use prelim_cli::{one_call, read_jobs, run_jobs};
use prelim_core::config::BridgeConfig;
use prelim_engine::get_default_engine;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <run|one> [args...]", prog);
        eprintln!("  run <job-file> [parallel]");
        eprintln!("  one <job> <query> <db> <params> [db_root] [chunk]");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let _log_guard = init_tracing(&config.log)?;
    let (cmd, args) = parse_args();
    let bridge = Bridge::new(get_default_engine(&config.engine.root_channel), &config);
    match cmd.as_str() {
        "run" => {
            let job_file = args.first().map(PathBuf::from).unwrap_or_else(|| {
                eprintln!("Usage: prelim-cli run <job-file> [parallel]"); std::process::exit(1)
            });
            let parallel = match args.get(1) {
                Some(n) => n.parse::<usize>().map_err(|e| anyhow::anyhow!("bad parallel '{}': {}", n, e))?,
                None => 1,
            };
            let jobs = read_jobs(&job_file)?;
            tracing::info!(jobs = jobs.len(), parallel, "running job file {}", job_file.display());
            let results = run_jobs(&bridge, jobs, parallel)?;
            let mut failed = 0usize;
            let mut rejected = 0usize;
            for (i, result) in results.iter().enumerate() {
                match result {
                    Ok(outcome) => {
                        if outcome.status.is_failure() { failed += 1; }
                        for line in &outcome.response { println!("{}", line); }
                    }
                    Err(e) => {
                        rejected += 1;
                        eprintln!("job {} rejected: {}", i + 1, e);
                    }
                }
            }
            tracing::info!(invocations = results.len(), failed, rejected, "job file complete");
        }
        "one" => {
            let call = one_call(&args).unwrap_or_else(|e| {
                eprintln!("{}\nUsage: prelim-cli one <job> <query> <db> <params> [db_root] [chunk]", e); std::process::exit(1)
            });
            let outcome = bridge.search(call)?;
            for line in &outcome.response { println!("{}", line); }
            tracing::info!(status = ?outcome.status, "done");
        }
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }
    Ok(())
}
