use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dcsstats_events::decode_lines;
use serde::{Deserialize, Serialize};

use crate::filename::FileNameInfo;
use crate::roster::PlayerRoster;
use crate::sortie::ReconstructOptions;
use crate::types::Session;
use crate::SessionError;

/// A named directory of session files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub dir: PathBuf,
}

impl Source {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }
}

/// Reads session files from a list of sources.
pub struct SourceStore {
    sources: Vec<Source>,
    options: ReconstructOptions,
}

impl SourceStore {
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources,
            options: ReconstructOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconstructOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Session files of a source, sorted by file name. Subdirectories are skipped.
    pub fn session_files(&self, source: &Source) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&source.dir).with_context(|| {
            format!(
                "Failed to read source '{}' at {:?}",
                source.name, source.dir
            )
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if entry.file_type()?.is_dir() {
                tracing::debug!("Skipping directory {:?}", path);
                continue;
            }

            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    /// Parse, decode and reconstruct a single session file.
    pub fn load_session(&self, source: &Source, path: &Path) -> Result<(FileNameInfo, Session)> {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SessionError::FilenameFormatError {
                file_name: path.display().to_string(),
                reason: "not a valid UTF-8 file name".to_string(),
            })?;
        let info = FileNameInfo::parse(file_name)?;

        let file =
            File::open(path).with_context(|| format!("Failed to open session file: {:?}", path))?;
        let events = decode_lines(BufReader::new(file), path)?;

        let mut session = Session::new(
            path.to_path_buf(),
            info.mission_name.clone(),
            info.session_start,
            source.name.clone(),
            events,
        );
        session.reconstruct_sorties(&self.options)?;

        Ok((info, session))
    }

    /// Load every session of every source into a roster.
    ///
    /// Stops at the first file that fails to parse; no partial roster is
    /// returned.
    pub fn load(&self) -> Result<PlayerRoster> {
        let mut roster = PlayerRoster::new();

        for source in &self.sources {
            let files = self.session_files(source)?;
            tracing::info!(source = %source.name, files = files.len(), "Reading source");

            for path in files {
                let (info, session) = self.load_session(source, &path)?;
                roster.insert(&info, session);
            }
        }

        tracing::info!(players = roster.len(), "Loaded players");
        Ok(roster)
    }
}
