use std::collections::{HashMap, VecDeque};

use crate::config::{FrightenedPolicy, Pathing, SimConfig};
use crate::constants::MIXED_CHASE_CHANCE;
use crate::maze::Maze;
use crate::mover;
use crate::rng::Rng;
use crate::types::{Direction, Position, PursuerKind};

#[derive(Clone, Copy, Debug)]
pub struct PolicyInput<'a> {
    pub maze: &'a Maze,
    pub config: &'a SimConfig,
    pub position: Position,
    pub heading: Direction,
    pub player: Position,
    pub player_heading: Direction,
}

/// Desired heading for this tick, already filtered through `can_step`.
/// `Direction::None` only comes back when the pursuer is boxed in.
pub fn decide(
    kind: PursuerKind,
    vulnerable: bool,
    input: &PolicyInput<'_>,
    rng: &mut Rng,
) -> Direction {
    if vulnerable {
        return frightened(input, rng);
    }
    match kind {
        PursuerKind::Chaser => chase(input, input.player),
        PursuerKind::Ambusher => chase(input, ambush_target(input)),
        PursuerKind::Mixed => {
            if rng.chance(MIXED_CHASE_CHANCE) {
                chase(input, input.player)
            } else {
                chase(input, ambush_target(input))
            }
        }
        PursuerKind::Fearful => {
            if input.position.manhattan(input.player) < input.config.fearful_radius {
                resolve(input, &away_priority(input.position, input.player))
            } else {
                wander(input, rng)
            }
        }
    }
}

/// Toward-target order: primary axis, secondary axis, then the two opposites
/// with the secondary one first. The axis with the larger absolute delta is
/// primary; ties go to the vertical axis.
pub fn axis_priority(from: Position, target: Position) -> [Direction; 4] {
    let dx = target.col - from.col;
    let dy = target.row - from.row;
    let horizontal = if dx < 0 {
        Direction::Left
    } else {
        Direction::Right
    };
    let vertical = if dy < 0 { Direction::Up } else { Direction::Down };
    let (primary, secondary) = if dx.abs() > dy.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };
    [
        primary,
        secondary,
        secondary.opposite(),
        primary.opposite(),
    ]
}

pub fn away_priority(from: Position, threat: Position) -> [Direction; 4] {
    axis_priority(from, threat).map(Direction::opposite)
}

pub fn ambush_target(input: &PolicyInput<'_>) -> Position {
    let (dx, dy) = input.player_heading.delta();
    let ahead = input.config.ambush_lookahead;
    Position::new(
        (input.player.col + dx * ahead).clamp(0, input.maze.width() - 1),
        (input.player.row + dy * ahead).clamp(0, input.maze.height() - 1),
    )
}

/// First step of a shortest open path from `from` to `to`, or `None` when
/// `to` is unreachable or already reached.
pub fn bfs_first_step(maze: &Maze, from: Position, to: Position) -> Option<Direction> {
    if from == to || maze.is_wall(to) {
        return None;
    }
    let mut first_step: HashMap<Position, Direction> = HashMap::new();
    let mut queue = VecDeque::new();
    first_step.insert(from, Direction::None);
    queue.push_back(from);
    while let Some(current) = queue.pop_front() {
        let via = first_step.get(&current).copied().unwrap_or(Direction::None);
        for dir in Direction::ALL {
            if !mover::can_step(maze, current, dir) {
                continue;
            }
            let next = mover::step(maze, current, dir);
            if first_step.contains_key(&next) {
                continue;
            }
            let origin_dir = if current == from { dir } else { via };
            if next == to {
                return Some(origin_dir);
            }
            first_step.insert(next, origin_dir);
            queue.push_back(next);
        }
    }
    None
}

fn chase(input: &PolicyInput<'_>, target: Position) -> Direction {
    if input.config.pathing == Pathing::Bfs {
        if let Some(dir) = bfs_first_step(input.maze, input.position, target) {
            return dir;
        }
    }
    resolve(input, &axis_priority(input.position, target))
}

fn frightened(input: &PolicyInput<'_>, rng: &mut Rng) -> Direction {
    match input.config.frightened {
        FrightenedPolicy::Flee => resolve(input, &away_priority(input.position, input.player)),
        FrightenedPolicy::Random => random_turn(input, rng),
    }
}

fn wander(input: &PolicyInput<'_>, rng: &mut Rng) -> Direction {
    let straight_ok = mover::can_step(input.maze, input.position, input.heading);
    if straight_ok && !rng.chance(input.config.wander_turn_chance) {
        return input.heading;
    }
    random_turn(input, rng)
}

fn random_turn(input: &PolicyInput<'_>, rng: &mut Rng) -> Direction {
    let legal = mover::legal_directions(input.maze, input.position);
    let forward: Vec<Direction> = legal
        .iter()
        .copied()
        .filter(|dir| *dir != input.heading.opposite())
        .collect();
    let pool = if forward.is_empty() { &legal } else { &forward };
    rng.pick(pool).unwrap_or(Direction::None)
}

fn resolve(input: &PolicyInput<'_>, candidates: &[Direction]) -> Direction {
    candidates
        .iter()
        .copied()
        .find(|dir| mover::can_step(input.maze, input.position, *dir))
        .or_else(|| {
            mover::can_step(input.maze, input.position, input.heading).then_some(input.heading)
        })
        .or_else(|| mover::first_legal(input.maze, input.position))
        .unwrap_or(Direction::None)
}
