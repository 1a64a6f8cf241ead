//! Host configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use game_core::GameConfig;
use runtime::RuntimeConfig;

/// Everything the headless host needs to start.
#[derive(Clone, Debug)]
pub struct HostConfig {
    pub runtime: RuntimeConfig,
    /// Write logs to a file as well as stderr.
    pub log_to_file: bool,
    /// Overrides the platform cache directory for log files.
    pub log_dir: Option<PathBuf>,
    /// Whether the in-memory ledger reports outside stakes.
    pub ledger_staked: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            log_to_file: false,
            log_dir: None,
            ledger_staked: false,
        }
    }
}

impl HostConfig {
    /// Construct host configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SIM_GAME_ID` - Game id shown in snapshots (default: `sim-1`)
    /// - `SIM_SEED` - Fixed RNG seed (default: random)
    /// - `SIM_LOBBY_SECS` / `SIM_ACTION_SECS` / `SIM_MEETING_SECS` - Phase lengths
    /// - `SIM_LOGIC_TICK_MS` / `SIM_MOVEMENT_TICK_MS` - Clock periods
    /// - `SIM_LOG_FILE` - Also log to a file (default: false)
    /// - `SIM_LOG_DIR` - Log directory; implies `SIM_LOG_FILE`
    /// - `SIM_LEDGER_STAKED` - Pretend every market has outside stakes
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(game_id) = env::var("SIM_GAME_ID") {
            config.runtime.game_id = game_id;
        }
        config.runtime.seed = read_env::<u64>("SIM_SEED");

        let game: &mut GameConfig = &mut config.runtime.game_config;
        if let Some(secs) = read_env::<u32>("SIM_LOBBY_SECS") {
            game.lobby_secs = secs.max(1);
        }
        if let Some(secs) = read_env::<u32>("SIM_ACTION_SECS") {
            game.action_secs = secs.max(1);
        }
        if let Some(secs) = read_env::<u32>("SIM_MEETING_SECS") {
            game.meeting_secs = secs.max(1);
        }

        if let Some(ms) = read_env::<u64>("SIM_LOGIC_TICK_MS") {
            config.runtime.logic_tick = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("SIM_MOVEMENT_TICK_MS") {
            config.runtime.movement_tick = Duration::from_millis(ms.max(1));
        }

        config.log_dir = env::var_os("SIM_LOG_DIR").map(PathBuf::from);
        config.log_to_file = read_env_bool("SIM_LOG_FILE").unwrap_or(false) || config.log_dir.is_some();
        config.ledger_staked = read_env_bool("SIM_LEDGER_STAKED").unwrap_or(false);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
