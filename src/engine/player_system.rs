use super::*;

use crate::mover;
use crate::types::TokenKind;

impl GameEngine {
    pub(super) fn advance_player(&mut self, now_ms: u64) {
        let pos = self.player.pos;
        let requested = self.player.requested_dir;
        if requested != self.player.dir && mover::can_step(&self.maze, pos, requested) {
            self.player.dir = requested;
        }

        let dir = self.player.dir;
        if mover::can_step(&self.maze, pos, dir) {
            self.player.pos = mover::step(&self.maze, pos, dir);
            self.player.mouth_open = !self.player.mouth_open;
        }

        self.apply_player_pickups(now_ms);
    }

    /// Tokens are collected from the player's cell every tick, moving or not.
    pub(super) fn apply_player_pickups(&mut self, now_ms: u64) {
        let pos = self.player.pos;
        match self.maze.consume_token(pos) {
            TokenKind::None => {}
            TokenKind::Pellet => {
                self.score += self.config.pellet_score;
                self.stats.pellets_eaten += 1;
                self.push_event(RuntimeEvent::PelletEaten {
                    col: pos.col,
                    row: pos.row,
                });
            }
            TokenKind::PowerPellet => {
                self.score += self.config.power_pellet_score;
                self.stats.power_pellets_eaten += 1;
                let vulnerable_until = self.trigger_vulnerability(now_ms);
                self.push_event(RuntimeEvent::PowerPelletEaten {
                    col: pos.col,
                    row: pos.row,
                    vulnerable_until,
                });
                debug!(col = pos.col, row = pos.row, vulnerable_until, "power pellet eaten");
            }
        }
    }

    pub(super) fn trigger_vulnerability(&mut self, now_ms: u64) -> u64 {
        let until = now_ms.saturating_add(self.config.vulnerable_duration_ms);
        for pursuer in &mut self.pursuers {
            pursuer.vulnerable = true;
            pursuer.vulnerable_until = until;
        }
        until
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimConfig;
    use crate::engine::GameEngine;
    use crate::maze::Layout;
    use crate::types::{Direction, Position};

    fn running(layout: &str) -> GameEngine {
        let mut engine = GameEngine::new(
            Layout::parse(layout).expect("layout parses"),
            SimConfig::default(),
        )
        .expect("layout is valid");
        engine.start();
        engine
    }

    #[test]
    fn blocked_request_is_kept_until_the_turn_opens() {
        let mut engine = running("#####\n#P..#\n###.#\n#####");
        engine.set_requested_direction(Direction::Right);
        engine.tick();
        engine.set_requested_direction(Direction::Down);
        engine.tick();
        assert_eq!(engine.player_position(), Position::new(3, 1));
        assert_eq!(engine.player_direction(), Direction::Right);

        engine.tick();
        assert_eq!(engine.player_position(), Position::new(3, 2));
        assert_eq!(engine.player_direction(), Direction::Down);
    }

    #[test]
    fn player_stops_against_a_wall_and_keeps_heading() {
        let mut engine = running("####\n#P.#\n####");
        engine.set_requested_direction(Direction::Right);
        engine.tick();
        engine.tick();
        assert_eq!(engine.player_position(), Position::new(2, 1));
        assert_eq!(engine.player_direction(), Direction::Right);
        assert_eq!(engine.score(), 10);
    }

    #[test]
    fn mouth_toggles_only_on_movement() {
        let mut engine = running("####\n#P.#\n#..#\n####");
        let start = engine.build_snapshot(false).player.mouth_open;
        engine.set_requested_direction(Direction::Right);
        engine.tick();
        let moved = engine.build_snapshot(false).player.mouth_open;
        assert_ne!(start, moved);
        engine.tick();
        assert_eq!(engine.build_snapshot(false).player.mouth_open, moved);
    }

    #[test]
    fn player_wraps_through_the_tunnel_row() {
        let mut engine = running("#####\nP....\n#####");
        engine.set_requested_direction(Direction::Left);
        engine.tick();
        assert_eq!(engine.player_position(), Position::new(4, 1));
    }

    #[test]
    fn power_pellet_scores_and_sets_deadline_for_all_pursuers() {
        let mut engine = running("#######\n#Po..C#\n#.....#\n#######");
        engine.set_requested_direction(Direction::Right);
        engine.tick();
        assert_eq!(engine.score(), 50);
        let now = engine.now_ms();
        for pursuer in engine.pursuers() {
            assert!(pursuer.vulnerable);
            assert_eq!(
                pursuer.vulnerable_until,
                now + engine.config.vulnerable_duration_ms
            );
        }
        assert_eq!(engine.build_summary().power_pellets_eaten, 1);
    }
}
