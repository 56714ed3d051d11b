use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::constants::EVENT_BUFFER_LIMIT;
use crate::error::EngineError;
use crate::high_score::HighScoreStore;
use crate::maze::{Layout, Maze};
use crate::rng::Rng;
use crate::types::{
    Direction, GameSummary, Lifecycle, Phase, PlayerView, Position, PursuerKind, PursuerView,
    RuntimeEvent, Snapshot,
};

mod autopilot;
mod player_system;
pub mod policy;
mod pursuer_system;

pub use self::autopilot::Autopilot;

#[derive(Clone, Debug, Default)]
struct SessionStats {
    pellets_eaten: u32,
    power_pellets_eaten: u32,
    captures: u32,
    lives_lost: u32,
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    pos: Position,
    origin: Position,
    dir: Direction,
    requested_dir: Direction,
    mouth_open: bool,
}

impl PlayerInternal {
    fn new(origin: Position) -> Self {
        Self {
            pos: origin,
            origin,
            dir: Direction::None,
            requested_dir: Direction::None,
            mouth_open: true,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.origin);
    }
}

#[derive(Clone, Debug)]
struct PursuerInternal {
    id: usize,
    kind: PursuerKind,
    pos: Position,
    origin: Position,
    dir: Direction,
    vulnerable: bool,
    vulnerable_until: u64,
}

impl PursuerInternal {
    fn new(id: usize, kind: PursuerKind, origin: Position) -> Self {
        Self {
            id,
            kind,
            pos: origin,
            origin,
            dir: Direction::None,
            vulnerable: false,
            vulnerable_until: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.id, self.kind, self.origin);
    }

    fn view(&self) -> PursuerView {
        PursuerView {
            id: self.id,
            kind: self.kind,
            col: self.pos.col,
            row: self.pos.row,
            dir: self.dir,
            vulnerable: self.vulnerable,
            vulnerable_until: self.vulnerable_until,
        }
    }
}

/// Time only advances through [`GameEngine::step`], and only while the
/// lifecycle is `Running`, so a paused game also freezes every vulnerability
/// deadline.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: SimConfig,

    maze: Maze,
    rng: Rng,
    player: PlayerInternal,
    pursuers: Vec<PursuerInternal>,
    events: Vec<RuntimeEvent>,
    stats: SessionStats,

    score: u32,
    lives: u32,
    phase: Phase,
    lifecycle: Lifecycle,
    elapsed_ms: u64,
    tick_counter: u64,
    high_score_offered: bool,
}

impl GameEngine {
    pub fn new(layout: Layout, config: SimConfig) -> Result<Self, EngineError> {
        config.validate()?;
        layout.validate()?;
        let reachable = layout.maze.reachable_from(layout.player_origin);
        let stranded = layout
            .maze
            .token_positions()
            .iter()
            .filter(|token| !reachable.contains(token))
            .count();
        if stranded > 0 {
            warn!(stranded, "tokens out of the player's reach, the game cannot be won");
        }
        let Layout {
            maze,
            player_origin,
            pursuers,
        } = layout;
        let pursuers = pursuers
            .into_iter()
            .enumerate()
            .map(|(id, spawn)| PursuerInternal::new(id, spawn.kind, spawn.origin))
            .collect();
        Ok(Self {
            rng: Rng::new(config.seed),
            lives: config.starting_lives,
            config,
            maze,
            player: PlayerInternal::new(player_origin),
            pursuers,
            events: Vec::new(),
            stats: SessionStats::default(),
            score: 0,
            phase: Phase::Playing,
            lifecycle: Lifecycle::Ready,
            elapsed_ms: 0,
            tick_counter: 0,
            high_score_offered: false,
        })
    }

    pub fn classic(config: SimConfig) -> Result<Self, EngineError> {
        Self::new(Layout::classic()?, config)
    }

    pub fn start(&mut self) {
        if self.lifecycle == Lifecycle::Ready {
            self.lifecycle = Lifecycle::Running;
            info!(seed = self.config.seed, "game started");
        }
    }

    pub fn pause(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.lifecycle = Lifecycle::Paused;
            self.push_event(RuntimeEvent::Paused);
            info!(now_ms = self.elapsed_ms, "game paused");
        }
    }

    pub fn resume(&mut self) {
        if self.lifecycle == Lifecycle::Paused {
            self.lifecycle = Lifecycle::Running;
            self.push_event(RuntimeEvent::Resumed);
            info!(now_ms = self.elapsed_ms, "game resumed");
        }
    }

    /// Back to a fresh session on the same layout. The lifecycle is left as
    /// it is, so a running game keeps running.
    pub fn reset(&mut self) {
        self.maze.restore_tokens();
        self.player.reset();
        for pursuer in &mut self.pursuers {
            pursuer.reset();
        }
        self.rng = Rng::new(self.config.seed);
        self.events.clear();
        self.stats = SessionStats::default();
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.phase = Phase::Playing;
        self.elapsed_ms = 0;
        self.tick_counter = 0;
        self.high_score_offered = false;
        self.push_event(RuntimeEvent::Reset);
        info!("game reset");
    }

    pub fn set_requested_direction(&mut self, dir: Direction) {
        self.player.requested_dir = dir;
    }

    pub fn tick(&mut self) {
        self.step(self.config.tick_ms);
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.lifecycle != Lifecycle::Running || self.phase.is_terminal() {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.elapsed_ms;

        let player_before_move = self.player.pos;
        let pursuers_before_move: Vec<Position> = self.pursuers.iter().map(|p| p.pos).collect();
        self.advance_player(now_ms);
        self.advance_pursuers(now_ms);
        self.resolve_collisions(player_before_move, &pursuers_before_move);

        if self.phase == Phase::Playing && self.maze.all_consumed() {
            self.set_phase(Phase::Won);
        }
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player_position(&self) -> Position {
        self.player.pos
    }

    pub fn player_direction(&self) -> Direction {
        self.player.dir
    }

    pub fn pursuers(&self) -> Vec<PursuerView> {
        self.pursuers.iter().map(PursuerInternal::view).collect()
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let events = if include_events {
            std::mem::take(&mut self.events)
        } else {
            Vec::new()
        };
        Snapshot {
            tick: self.tick_counter,
            now_ms: self.elapsed_ms,
            score: self.score,
            lives: self.lives,
            phase: self.phase,
            lifecycle: self.lifecycle,
            remaining_pellets: self.maze.remaining_pellet_count(),
            remaining_power_pellets: self.maze.remaining_power_pellet_count(),
            tiles: self.maze.tiles(),
            player: PlayerView {
                col: self.player.pos.col,
                row: self.player.pos.row,
                dir: self.player.dir,
                requested_dir: self.player.requested_dir,
                mouth_open: self.player.mouth_open,
            },
            pursuers: self.pursuers(),
            events,
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            ticks: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            pellets_eaten: self.stats.pellets_eaten,
            power_pellets_eaten: self.stats.power_pellets_eaten,
            captures: self.stats.captures,
            lives_lost: self.stats.lives_lost,
        }
    }

    /// Hands the final score to the high-score store once per finished game.
    /// Returns `None` while the game is still playing or after the score was
    /// already offered.
    pub fn offer_high_score(&mut self, store: &mut HighScoreStore) -> Option<bool> {
        if !self.phase.is_terminal() || self.high_score_offered {
            return None;
        }
        self.high_score_offered = true;
        let is_new = store.offer(self.score);
        if is_new {
            info!(score = self.score, "new high score");
        }
        Some(is_new)
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        self.phase = phase;
        self.push_event(RuntimeEvent::PhaseChanged { phase });
        info!(
            ?phase,
            score = self.score,
            lives = self.lives,
            tick = self.tick_counter,
            "game finished"
        );
    }

    fn push_event(&mut self, event: RuntimeEvent) {
        if self.events.len() >= EVENT_BUFFER_LIMIT {
            let overflow = self.events.len() + 1 - EVENT_BUFFER_LIMIT;
            self.events.drain(..overflow);
            debug!(overflow, "dropped undrained runtime events");
        }
        self.events.push(event);
    }
}
