//! Engines implementing the four-operation preliminary-search contract.

pub mod env_root;
pub mod fixture;
pub mod scripted;

pub use env_root::EnvRootEngine;
pub use fixture::FixtureEngine;
pub use scripted::{hit, Script, ScriptedEngine};

use prelim_core::config::RootChannel;
use prelim_core::traits::SearchEngine;

/// Engine for command-line runs: the fixture engine, or a scripted engine
/// answering every database with two demo hits when `APP_USE_SCRIPTED_ENGINE`
/// is set. Under `RootChannel::ProcessEnv` the fixture engine reads its root
/// from that variable.
pub fn get_default_engine(channel: &RootChannel) -> Box<dyn SearchEngine> {
    let use_scripted = std::env::var("APP_USE_SCRIPTED_ENGINE")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_scripted {
        tracing::info!("using scripted engine");
        return Box::new(ScriptedEngine::new(Script::batches(vec![vec![
            hit(0, 64, (0, 31), (100, 131)),
            hit(3, 48, (5, 29), (880, 904)),
        ]])));
    }
    match channel {
        RootChannel::Parameter => Box::new(FixtureEngine::new()),
        RootChannel::ProcessEnv(var) => Box::new(FixtureEngine::with_root_var(var.as_str())),
    }
}
