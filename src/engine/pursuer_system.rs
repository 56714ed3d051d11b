use super::*;

use crate::engine::policy::{self, PolicyInput};
use crate::mover;

impl GameEngine {
    pub(super) fn advance_pursuers(&mut self, now_ms: u64) {
        let player = self.player.pos;
        let player_heading = self.player.dir;
        for idx in 0..self.pursuers.len() {
            self.expire_vulnerability(idx, now_ms);

            let pursuer = &self.pursuers[idx];
            let input = PolicyInput {
                maze: &self.maze,
                config: &self.config,
                position: pursuer.pos,
                heading: pursuer.dir,
                player,
                player_heading,
            };
            let dir = policy::decide(pursuer.kind, pursuer.vulnerable, &input, &mut self.rng);

            let pursuer = &mut self.pursuers[idx];
            if mover::can_step(&self.maze, pursuer.pos, dir) {
                pursuer.pos = mover::step(&self.maze, pursuer.pos, dir);
            }
            pursuer.dir = dir;
        }
    }

    fn expire_vulnerability(&mut self, idx: usize, now_ms: u64) {
        let pursuer = &mut self.pursuers[idx];
        if pursuer.vulnerable && now_ms >= pursuer.vulnerable_until {
            pursuer.vulnerable = false;
            debug!(pursuer = pursuer.id, now_ms, "vulnerability expired");
        }
    }

    /// Shared cells and swapped cells both count as contact. Pursuers are
    /// checked in tick order; a lost life ends the pass because every agent
    /// has just been sent home.
    pub(super) fn resolve_collisions(
        &mut self,
        player_before_move: Position,
        pursuers_before_move: &[Position],
    ) {
        for idx in 0..self.pursuers.len() {
            let pursuer = &self.pursuers[idx];
            let overlap = pursuer.pos == self.player.pos;
            let swapped = pursuers_before_move.get(idx).is_some_and(|before| {
                *before == self.player.pos && player_before_move == pursuer.pos
            });
            if !overlap && !swapped {
                continue;
            }

            if pursuer.vulnerable {
                self.capture_pursuer(idx);
            } else {
                self.lose_life();
                return;
            }
        }
    }

    fn capture_pursuer(&mut self, idx: usize) {
        self.score += self.config.capture_score;
        self.stats.captures += 1;
        let pursuer = &mut self.pursuers[idx];
        pursuer.reset();
        let event = RuntimeEvent::PursuerCaptured {
            pursuer_id: pursuer.id,
            kind: pursuer.kind,
        };
        debug!(pursuer = pursuer.id, kind = pursuer.kind.label(), "pursuer captured");
        self.push_event(event);
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.lives_lost += 1;
        self.player.reset();
        for pursuer in &mut self.pursuers {
            pursuer.reset();
        }
        self.push_event(RuntimeEvent::LifeLost {
            lives_left: self.lives,
        });
        debug!(lives_left = self.lives, tick = self.tick_counter, "life lost");
        if self.lives == 0 {
            self.set_phase(Phase::Lost);
        }
    }
}
