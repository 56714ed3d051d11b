use std::collections::{HashSet, VecDeque};

use crate::constants::CLASSIC_LAYOUT;
use crate::error::LayoutError;
use crate::mover;
use crate::types::{Cell, Direction, Position, PursuerKind, TokenKind};

/// Walls never change after construction; the only mutation is a token cell
/// turning `Open` when consumed. Both token counters are kept in lockstep with
/// the cells so that `all_consumed` never has to scan the grid.
#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    pristine: Vec<Cell>,
    remaining_pellets: usize,
    remaining_power_pellets: usize,
}

impl Maze {
    /// Parses tile rows: `#` wall, `.` pellet, `o` power pellet, space open.
    /// Agent markers (`P`, `C`, `A`, `M`, `F`) are read as open cells.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(LayoutError::Empty);
        };
        let width = first.chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Pellet,
                    'o' => Cell::PowerPellet,
                    ' ' | 'P' => Cell::Open,
                    other if PursuerKind::from_marker(other).is_some() => Cell::Open,
                    other => {
                        return Err(LayoutError::UnknownTile {
                            col,
                            row,
                            ch: other,
                        })
                    }
                };
                cells.push(cell);
            }
        }
        Ok(Self::from_cells(width as i32, rows.len() as i32, cells))
    }

    fn from_cells(width: i32, height: i32, cells: Vec<Cell>) -> Self {
        let remaining_pellets = cells.iter().filter(|c| **c == Cell::Pellet).count();
        let remaining_power_pellets = cells.iter().filter(|c| **c == Cell::PowerPellet).count();
        Self {
            width,
            height,
            pristine: cells.clone(),
            cells,
            remaining_pellets,
            remaining_power_pellets,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.col >= 0 && pos.row >= 0 && pos.col < self.width && pos.row < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.row * self.width + pos.col) as usize)
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx).copied())
            .unwrap_or(Cell::Wall)
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.cell(pos) == Cell::Wall
    }

    pub fn token_at(&self, pos: Position) -> TokenKind {
        match self.cell(pos) {
            Cell::Pellet => TokenKind::Pellet,
            Cell::PowerPellet => TokenKind::PowerPellet,
            Cell::Wall | Cell::Open => TokenKind::None,
        }
    }

    pub fn consume_token(&mut self, pos: Position) -> TokenKind {
        let Some(idx) = self.index(pos) else {
            return TokenKind::None;
        };
        match self.cells[idx] {
            Cell::Pellet => {
                self.cells[idx] = Cell::Open;
                self.remaining_pellets = self.remaining_pellets.saturating_sub(1);
                TokenKind::Pellet
            }
            Cell::PowerPellet => {
                self.cells[idx] = Cell::Open;
                self.remaining_power_pellets = self.remaining_power_pellets.saturating_sub(1);
                TokenKind::PowerPellet
            }
            Cell::Wall | Cell::Open => TokenKind::None,
        }
    }

    pub fn remaining_pellet_count(&self) -> usize {
        self.remaining_pellets
    }

    pub fn remaining_power_pellet_count(&self) -> usize {
        self.remaining_power_pellets
    }

    pub fn all_consumed(&self) -> bool {
        self.remaining_pellets == 0 && self.remaining_power_pellets == 0
    }

    pub fn restore_tokens(&mut self) {
        self.cells.clone_from(&self.pristine);
        self.remaining_pellets = self.cells.iter().filter(|c| **c == Cell::Pellet).count();
        self.remaining_power_pellets = self
            .cells
            .iter()
            .filter(|c| **c == Cell::PowerPellet)
            .count();
    }

    /// Neighbouring cell in `dir`, wrapping columns at the left/right edges.
    /// Rows never wrap, so leaving the grid vertically yields `None`.
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let row = pos.row + dy;
        if row < 0 || row >= self.height || self.width == 0 {
            return None;
        }
        let col = (pos.col + dx).rem_euclid(self.width);
        Some(Position::new(col, row))
    }

    pub fn tiles(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|cell| cell.tile_char()).collect())
            .collect()
    }

    pub fn token_positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = Position::new(col, row);
                if self.token_at(pos) != TokenKind::None {
                    out.push(pos);
                }
            }
        }
        out
    }

    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        let mut visited = HashSet::new();
        if self.is_wall(start) {
            return visited;
        }
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for dir in Direction::ALL {
                let Some(next) = self.neighbor(current, dir) else {
                    continue;
                };
                if self.is_wall(next) || !visited.insert(next) {
                    continue;
                }
                queue.push_back(next);
            }
        }
        visited
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PursuerSpawn {
    pub kind: PursuerKind,
    pub origin: Position,
}

#[derive(Clone, Debug)]
pub struct Layout {
    pub maze: Maze,
    pub player_origin: Position,
    pub pursuers: Vec<PursuerSpawn>,
}

impl Layout {
    pub fn new(maze: Maze, player_origin: Position, pursuers: Vec<PursuerSpawn>) -> Self {
        Self {
            maze,
            player_origin,
            pursuers,
        }
    }

    /// Parses a maze whose agent origins are given by markers. Pursuers are
    /// created in reading order, which fixes their tick order.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let maze = Maze::parse(text)?;
        let mut player_origin = None;
        let mut pursuers = Vec::new();
        let rows = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty());
        for (row, line) in rows.enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(col as i32, row as i32);
                if ch == 'P' {
                    if player_origin.replace(pos).is_some() {
                        return Err(LayoutError::DuplicatePlayer);
                    }
                } else if let Some(kind) = PursuerKind::from_marker(ch) {
                    pursuers.push(PursuerSpawn { kind, origin: pos });
                }
            }
        }
        let player_origin = player_origin.ok_or(LayoutError::MissingPlayer)?;
        Ok(Self::new(maze, player_origin, pursuers))
    }

    pub fn classic() -> Result<Self, LayoutError> {
        Self::parse(CLASSIC_LAYOUT)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        check_origin(&self.maze, "player", self.player_origin)?;
        for (idx, spawn) in self.pursuers.iter().enumerate() {
            let agent = format!("pursuer {idx} ({})", spawn.kind.label());
            check_origin(&self.maze, &agent, spawn.origin)?;
        }
        Ok(())
    }
}

fn check_origin(maze: &Maze, agent: &str, pos: Position) -> Result<(), LayoutError> {
    if !maze.in_bounds(pos) {
        return Err(LayoutError::OriginOutOfBounds {
            agent: agent.to_string(),
            col: pos.col,
            row: pos.row,
        });
    }
    if maze.is_wall(pos) {
        return Err(LayoutError::OriginInWall {
            agent: agent.to_string(),
            col: pos.col,
            row: pos.row,
        });
    }
    if mover::first_legal(maze, pos).is_none() {
        return Err(LayoutError::OriginEnclosed {
            agent: agent.to_string(),
            col: pos.col,
            row: pos.row,
        });
    }
    Ok(())
}
