use bytes::Bytes;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::AUDIO_FILE_EXTENSION;
use crate::utils::{ParleyError, ParleyResult};

/// A synthesized response written to disk
#[derive(Debug, Clone)]
pub struct StoredAudio {
    pub filename: String,
    pub path: PathBuf,
}

/// Listing entry for a saved audio file
#[derive(Debug, Clone, Serialize)]
pub struct AudioFileInfo {
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: String,
    pub download_url: String,
}

/// Directory of synthesized MP3 responses
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write audio under a fresh `response_<uuid>.mp3` name
    pub async fn save(&self, audio: &[u8]) -> ParleyResult<StoredAudio> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!("response_{}.{}", Uuid::new_v4(), AUDIO_FILE_EXTENSION);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, audio).await?;

        info!(file = %path.display(), bytes = audio.len(), "saved audio response");
        Ok(StoredAudio { filename, path })
    }

    /// Path of a saved file; anything that isn't a plain filename in this
    /// directory is reported as not found
    pub fn resolve(&self, filename: &str) -> ParleyResult<PathBuf> {
        let is_plain = !filename.is_empty()
            && !filename.contains(['/', '\\'])
            && filename != "."
            && filename != "..";
        let path = self.dir.join(filename);

        if !is_plain || !path.is_file() {
            debug!(filename, "audio file lookup failed");
            return Err(ParleyError::NotFound("Audio file not found".to_string()));
        }
        Ok(path)
    }

    pub async fn read(&self, filename: &str) -> ParleyResult<Bytes> {
        let path = self.resolve(filename)?;
        Ok(Bytes::from(tokio::fs::read(path).await?))
    }

    /// All saved MP3 files, newest first. A missing directory yields `None`.
    pub async fn list(&self) -> ParleyResult<Option<Vec<AudioFileInfo>>> {
        if !self.dir.exists() {
            return Ok(None);
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(AUDIO_FILE_EXTENSION) {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(String::from)
            else {
                continue;
            };

            let metadata = entry.metadata().await?;
            let created: DateTime<Local> = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::from)
                .unwrap_or_else(|_| Local::now());

            files.push(AudioFileInfo {
                download_url: format!("/download-audio/{}", filename),
                filename,
                size_bytes: metadata.len(),
                created_at: created.to_rfc3339(),
            });
        }

        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Some(files))
    }
}
