use std::env;
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::infra::{ApiError, GameConnection, GameObserver, MoveRequest};
use crate::planners::BoosterPlanner;
use crate::planners::heuristic::{StrategyPlanner, get_env_var};

const TICK_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// Settings of the polling loop around the engine.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub base_url: String,
    pub auth_token: String,
    /// Longest path sent for one agent, in cells including the start.
    pub max_path_length: usize,
    /// Pause after every request.
    pub request_delay: Duration,
    /// Extra attempts for a failing tick.
    pub retries: u32,
    /// Pause after a tick has failed every attempt.
    pub failure_backoff: Duration,
    pub booster_interval: Duration,
    pub seed: Option<u64>,
}

impl RunnerConfig {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            max_path_length: 30,
            request_delay: Duration::from_millis(300),
            retries: 3,
            failure_backoff: Duration::from_secs(1),
            booster_interval: Duration::from_secs(20),
            seed: None,
        }
    }

    /// Reads `GAME_*` variables; the base URL and token are required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let base_url = env::var("GAME_BASE_URL")
            .map_err(|_| "GAME_BASE_URL environment variable is required")?;
        let auth_token = env::var("GAME_AUTH_TOKEN")
            .map_err(|_| "GAME_AUTH_TOKEN environment variable is required")?;
        let defaults = Self::new(base_url, auth_token);

        Ok(Self {
            max_path_length: get_env_var("GAME_MAX_PATH_LENGTH")
                .unwrap_or(defaults.max_path_length),
            request_delay: get_env_var("GAME_REQUEST_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
            retries: get_env_var("GAME_RETRIES").unwrap_or(defaults.retries),
            failure_backoff: get_env_var("GAME_FAILURE_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.failure_backoff),
            booster_interval: get_env_var("GAME_BOOSTER_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.booster_interval),
            seed: get_env_var("GAME_SEED"),
            ..defaults
        })
    }
}

/// `HH:MM:SS.mmm-T###` label tagging one tick's log lines.
pub fn tick_id(at: OffsetDateTime, tick: u64) -> String {
    let stamp = at.format(TICK_TIME_FORMAT).unwrap_or_default();
    format!("{}-T{:03}", stamp, tick)
}

pub struct Game {
    connection: GameConnection,
    observer: Box<dyn GameObserver>,
    planner: StrategyPlanner,
    boosters: BoosterPlanner,
    config: RunnerConfig,
    tick_counter: u64,
}

impl Game {
    pub fn new(
        connection: GameConnection,
        observer: impl GameObserver + 'static,
        planner: StrategyPlanner,
        config: RunnerConfig,
    ) -> Self {
        Self {
            connection,
            observer: Box::new(observer),
            planner,
            boosters: BoosterPlanner::new(config.booster_interval),
            config,
            tick_counter: 0,
        }
    }

    /// Poll the arena forever. Failed ticks are logged and skipped.
    pub async fn run(&mut self) {
        info!(
            "Starting game loop: {}ms between requests, booster check every {}s",
            self.config.request_delay.as_millis(),
            self.config.booster_interval.as_secs()
        );
        loop {
            self.run_tick().await;
        }
    }

    pub async fn run_tick(&mut self) {
        self.tick_counter += 1;
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let tick_id = tick_id(now, self.tick_counter);
        let tick_start = Instant::now();
        self.observer.on_tick_start(&tick_id);

        let mut attempt = 0;
        loop {
            match self.process_tick(&tick_id).await {
                Ok(()) => break,
                Err(e) if attempt < self.config.retries => {
                    attempt += 1;
                    warn!("[{}] │ attempt {} failed: {}", tick_id, attempt, e);
                }
                Err(e) => {
                    self.observer.on_tick_failed(&tick_id, &e);
                    sleep(self.config.failure_backoff).await;
                    break;
                }
            }
        }

        info!(
            "[{}] └─── done in {:.2}ms (boosters bought: {})",
            tick_id,
            tick_start.elapsed().as_secs_f64() * 1000.0,
            self.boosters.purchased()
        );
    }

    async fn process_tick(&mut self, tick_id: &str) -> Result<(), ApiError> {
        let arena = self.connection.arena().await?;
        self.observer.on_arena_received(tick_id, &arena);
        sleep(self.config.request_delay).await;

        if !arena.is_active() {
            info!("[{}] │ no active round (code={}), skipping", tick_id, arena.code);
            return Ok(());
        }

        let boosters = self.connection.boosters().await?;
        self.observer.on_booster_state(tick_id, &boosters.state);
        if let Some(booster) = self.boosters.choose(Instant::now(), &boosters) {
            let result = self.connection.purchase_booster(&booster.booster_type).await;
            if result.is_ok() {
                self.boosters.record_purchase();
            }
            self.observer.on_booster_purchase(tick_id, &booster, &result);
        }
        sleep(self.config.request_delay).await;

        let snapshot = arena.to_snapshot()?;
        let mut commands = self.planner.decide_commands(&snapshot);
        for command in &mut commands {
            if command.truncate_path(self.config.max_path_length) {
                warn!(
                    "[{}] │ truncated path of {} to {} cells",
                    tick_id, command.agent_id, self.config.max_path_length
                );
            }
        }
        self.observer.on_commands_chosen(tick_id, &commands);

        if commands.is_empty() {
            debug!("[{}] │ no commands to send", tick_id);
        } else {
            self.connection
                .send_moves(&MoveRequest::from_commands(&commands))
                .await?;
        }
        sleep(self.config.request_delay).await;
        Ok(())
    }
}
