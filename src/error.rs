use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {ch:?} at ({col}, {row})")]
    UnknownTile { col: usize, row: usize, ch: char },
    #[error("layout has no player origin")]
    MissingPlayer,
    #[error("layout has more than one player origin")]
    DuplicatePlayer,
    #[error("{agent} origin ({col}, {row}) is outside the maze")]
    OriginOutOfBounds { agent: String, col: i32, row: i32 },
    #[error("{agent} origin ({col}, {row}) is inside a wall")]
    OriginInWall { agent: String, col: i32, row: i32 },
    #[error("{agent} origin ({col}, {row}) has no open neighbor")]
    OriginEnclosed { agent: String, col: i32, row: i32 },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("high score file {path} does not hold an integer: {value:?}")]
    Parse { path: PathBuf, value: String },
}
