use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::HighScoreError;

#[derive(Clone, Debug, Serialize)]
pub struct HighScoreResponse {
    #[serde(rename = "generatedAtIso")]
    pub generated_at_iso: String,
    #[serde(rename = "highScore")]
    pub high_score: u32,
}

/// Best score ever seen, persisted as a single integer in a text file.
///
/// A missing or broken file never blocks play: it reads as zero and the
/// next better score overwrites it.
pub struct HighScoreStore {
    file_path: PathBuf,
    best: u32,
}

impl HighScoreStore {
    pub fn open(file_path: PathBuf) -> Self {
        let best = match read_high_score(&file_path) {
            Ok(value) => value.unwrap_or(0),
            Err(error) => {
                warn!(%error, "starting from a zero high score");
                0
            }
        };
        Self { file_path, best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn offer(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(error) = write_high_score(&self.file_path, score) {
            warn!(%error, "high score kept in memory only");
        }
        true
    }

    pub fn build_response(&self) -> HighScoreResponse {
        HighScoreResponse {
            generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            high_score: self.best,
        }
    }
}

pub fn read_high_score(path: &Path) -> Result<Option<u32>, HighScoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(HighScoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let value = text.trim();
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| HighScoreError::Parse {
            path: path.to_path_buf(),
            value: value.to_string(),
        })
}

pub fn write_high_score(path: &Path, score: u32) -> Result<(), HighScoreError> {
    let io_error = |source| HighScoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }
    fs::write(path, format!("{score}\n")).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!(
            "{}-{}-{}",
            name,
            std::process::id(),
            rand::random::<u32>()
        );
        std::env::temp_dir().join(unique).join("highscore.dat")
    }

    #[test]
    fn missing_file_starts_at_zero() {
        let path = temp_file("high-score-missing");
        assert!(matches!(read_high_score(&path), Ok(None)));
        let store = HighScoreStore::open(path);
        assert_eq!(store.best(), 0);
    }

    #[test]
    fn offer_persists_only_strict_improvements() {
        let path = temp_file("high-score-offer");
        let mut store = HighScoreStore::open(path.clone());
        assert!(store.offer(120));
        assert!(!store.offer(120));
        assert!(!store.offer(80));
        assert!(store.offer(300));
        assert_eq!(read_high_score(&path).expect("file reads"), Some(300));

        let reopened = HighScoreStore::open(path.clone());
        assert_eq!(reopened.best(), 300);
        let _ = fs::remove_dir_all(path.parent().expect("temp dir"));
    }

    #[test]
    fn garbage_file_reads_as_zero() {
        let path = temp_file("high-score-garbage");
        write_high_score(&path, 5).expect("seed file");
        fs::write(&path, "not a number").expect("overwrite file");
        assert!(matches!(
            read_high_score(&path),
            Err(HighScoreError::Parse { .. })
        ));
        let mut store = HighScoreStore::open(path.clone());
        assert_eq!(store.best(), 0);
        assert!(store.offer(1));
        assert_eq!(read_high_score(&path).expect("file reads"), Some(1));
        let _ = fs::remove_dir_all(path.parent().expect("temp dir"));
    }

    #[test]
    fn response_carries_best_score() {
        let mut store = HighScoreStore::open(temp_file("high-score-response"));
        store.offer(42);
        let value = serde_json::to_value(store.build_response()).expect("response serializes");
        assert_eq!(value["highScore"], 42);
        assert!(value["generatedAtIso"].as_str().is_some());
        let _ = fs::remove_dir_all(store.path().parent().expect("temp dir"));
    }
}
