/// Game configuration constants and tunable parameters.
///
/// Every balance knob of the simulation lives here so the engine never
/// hardcodes a probability or duration. Timers are in logic ticks (one per
/// second); movement values are per movement tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    // ===== phase timers (seconds) =====
    pub lobby_secs: u32,
    pub action_secs: u32,
    pub meeting_secs: u32,
    pub reset_secs: u32,
    /// Added to the lobby timer when it expires without enough players.
    pub lobby_extension_secs: u32,

    // ===== roster =====
    pub min_players: usize,
    pub max_players: usize,
    pub impostor_count: usize,
    /// Logic ticks between two lobby spawns pulled from the identity feed.
    pub spawn_interval: u32,

    // ===== tasks =====
    pub tasks_per_crewmate: usize,
    pub task_duration_ticks: u32,

    // ===== kills =====
    pub kill_cooldown_ticks: u32,
    pub kill_chance: f64,
    pub witness_chance: f64,

    // ===== sabotage =====
    pub sabotage_grace_ticks: u32,
    pub sabotage_chance: f64,
    pub repair_duration_ticks: u32,

    // ===== meetings =====
    pub crew_correct_vote_chance: f64,
    /// Seconds remaining in a meeting at which autonomous agents vote.
    pub auto_vote_at: u32,
    pub meeting_chat_cap: u32,

    // ===== movement =====
    pub move_step: f64,
    pub idle_min_ticks: u32,
    pub idle_max_ticks: u32,
}

impl GameConfig {
    pub const DEFAULT_LOBBY_SECS: u32 = 60;
    pub const DEFAULT_ACTION_SECS: u32 = 240;
    pub const DEFAULT_MEETING_SECS: u32 = 15;
    pub const DEFAULT_RESET_SECS: u32 = 20;
    pub const DEFAULT_LOBBY_EXTENSION_SECS: u32 = 10;

    pub const DEFAULT_MIN_PLAYERS: usize = 4;
    pub const DEFAULT_MAX_PLAYERS: usize = 10;
    pub const DEFAULT_IMPOSTOR_COUNT: usize = 2;
    pub const DEFAULT_SPAWN_INTERVAL: u32 = 4;

    pub const DEFAULT_TASKS_PER_CREWMATE: usize = 3;
    pub const DEFAULT_TASK_DURATION_TICKS: u32 = 4;

    pub const DEFAULT_KILL_COOLDOWN_TICKS: u32 = 25;
    pub const DEFAULT_KILL_CHANCE: f64 = 0.015;
    pub const DEFAULT_WITNESS_CHANCE: f64 = 0.5;

    pub const DEFAULT_SABOTAGE_GRACE_TICKS: u32 = 45;
    pub const DEFAULT_SABOTAGE_CHANCE: f64 = 0.03;
    pub const DEFAULT_REPAIR_DURATION_TICKS: u32 = 8;

    pub const DEFAULT_CREW_CORRECT_VOTE_CHANCE: f64 = 0.3;
    pub const DEFAULT_AUTO_VOTE_AT: u32 = 5;
    pub const DEFAULT_MEETING_CHAT_CAP: u32 = 7;

    pub const DEFAULT_MOVE_STEP: f64 = 6.0;
    pub const DEFAULT_IDLE_MIN_TICKS: u32 = 2;
    pub const DEFAULT_IDLE_MAX_TICKS: u32 = 5;

    pub fn new() -> Self {
        Self {
            lobby_secs: Self::DEFAULT_LOBBY_SECS,
            action_secs: Self::DEFAULT_ACTION_SECS,
            meeting_secs: Self::DEFAULT_MEETING_SECS,
            reset_secs: Self::DEFAULT_RESET_SECS,
            lobby_extension_secs: Self::DEFAULT_LOBBY_EXTENSION_SECS,
            min_players: Self::DEFAULT_MIN_PLAYERS,
            max_players: Self::DEFAULT_MAX_PLAYERS,
            impostor_count: Self::DEFAULT_IMPOSTOR_COUNT,
            spawn_interval: Self::DEFAULT_SPAWN_INTERVAL,
            tasks_per_crewmate: Self::DEFAULT_TASKS_PER_CREWMATE,
            task_duration_ticks: Self::DEFAULT_TASK_DURATION_TICKS,
            kill_cooldown_ticks: Self::DEFAULT_KILL_COOLDOWN_TICKS,
            kill_chance: Self::DEFAULT_KILL_CHANCE,
            witness_chance: Self::DEFAULT_WITNESS_CHANCE,
            sabotage_grace_ticks: Self::DEFAULT_SABOTAGE_GRACE_TICKS,
            sabotage_chance: Self::DEFAULT_SABOTAGE_CHANCE,
            repair_duration_ticks: Self::DEFAULT_REPAIR_DURATION_TICKS,
            crew_correct_vote_chance: Self::DEFAULT_CREW_CORRECT_VOTE_CHANCE,
            auto_vote_at: Self::DEFAULT_AUTO_VOTE_AT,
            meeting_chat_cap: Self::DEFAULT_MEETING_CHAT_CAP,
            move_step: Self::DEFAULT_MOVE_STEP,
            idle_min_ticks: Self::DEFAULT_IDLE_MIN_TICKS,
            idle_max_ticks: Self::DEFAULT_IDLE_MAX_TICKS,
        }
    }

    pub fn with_phase_secs(mut self, lobby: u32, action: u32, meeting: u32, reset: u32) -> Self {
        self.lobby_secs = lobby;
        self.action_secs = action;
        self.meeting_secs = meeting;
        self.reset_secs = reset;
        self
    }

    pub fn with_kill_chances(mut self, kill: f64, witness: f64) -> Self {
        self.kill_chance = kill;
        self.witness_chance = witness;
        self
    }

    pub fn with_sabotage(mut self, grace_ticks: u32, chance: f64) -> Self {
        self.sabotage_grace_ticks = grace_ticks;
        self.sabotage_chance = chance;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
