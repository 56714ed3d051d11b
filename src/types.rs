use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.col - other.col).abs() + (self.row - other.row).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Wall,
    Open,
    Pellet,
    PowerPellet,
}

impl Cell {
    pub fn tile_char(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Open => ' ',
            Self::Pellet => '.',
            Self::PowerPellet => 'o',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    None,
    Pellet,
    PowerPellet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerKind {
    Chaser,
    Ambusher,
    Mixed,
    Fearful,
}

impl PursuerKind {
    pub fn from_marker(ch: char) -> Option<Self> {
        match ch {
            'C' => Some(Self::Chaser),
            'A' => Some(Self::Ambusher),
            'M' => Some(Self::Mixed),
            'F' => Some(Self::Fearful),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Chaser => "chaser",
            Self::Ambusher => "ambusher",
            Self::Mixed => "mixed",
            Self::Fearful => "fearful",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    Lost,
    Won,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self != Self::Playing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Ready,
    Running,
    Paused,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub col: i32,
    pub row: i32,
    pub dir: Direction,
    #[serde(rename = "requestedDir")]
    pub requested_dir: Direction,
    #[serde(rename = "mouthOpen")]
    pub mouth_open: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PursuerView {
    pub id: usize,
    pub kind: PursuerKind,
    pub col: i32,
    pub row: i32,
    pub dir: Direction,
    pub vulnerable: bool,
    #[serde(rename = "vulnerableUntil")]
    pub vulnerable_until: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten {
        col: i32,
        row: i32,
    },
    PowerPelletEaten {
        col: i32,
        row: i32,
        #[serde(rename = "vulnerableUntil")]
        vulnerable_until: u64,
    },
    PursuerCaptured {
        #[serde(rename = "pursuerId")]
        pursuer_id: usize,
        kind: PursuerKind,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    PhaseChanged {
        phase: Phase,
    },
    Paused,
    Resumed,
    Reset,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub score: u32,
    pub lives: u32,
    pub phase: Phase,
    pub lifecycle: Lifecycle,
    #[serde(rename = "remainingPellets")]
    pub remaining_pellets: usize,
    #[serde(rename = "remainingPowerPellets")]
    pub remaining_power_pellets: usize,
    pub tiles: Vec<String>,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub ticks: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: u32,
    #[serde(rename = "powerPelletsEaten")]
    pub power_pellets_eaten: u32,
    pub captures: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Direction::None.opposite(), Direction::None);
    }

    #[test]
    fn parse_move_rejects_unknown_values() {
        assert_eq!(Direction::parse_move("left"), Some(Direction::Left));
        assert_eq!(Direction::parse_move("none"), Some(Direction::None));
        assert_eq!(Direction::parse_move("LEFT"), None);
        assert_eq!(Direction::parse_move(""), None);
    }

    #[test]
    fn runtime_event_serializes_with_type_tag() {
        let value = serde_json::to_value(RuntimeEvent::LifeLost { lives_left: 2 })
            .expect("event should serialize");
        assert_eq!(value["type"], "life_lost");
        assert_eq!(value["livesLeft"], 2);
    }
}
