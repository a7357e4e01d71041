use serde::{Deserialize, Serialize};

use crate::SessionError;

const TOKEN_SEPARATOR: &str = "-[";

/// Metadata encoded in a session file name:
/// `<epochStart>-[<missionName>]-[<playerName>]-[<playerId>].csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNameInfo {
    pub session_start: i64,
    pub mission_name: String,
    pub player_name: String,
    pub player_id: String,
}

impl FileNameInfo {
    /// Parse a bare file name (no directory part).
    ///
    /// Tokens are taken verbatim; brackets inside names are not unescaped.
    pub fn parse(file_name: &str) -> Result<Self, SessionError> {
        let tokens: Vec<&str> = file_name
            .split(TOKEN_SEPARATOR)
            .map(|token| {
                token
                    .strip_suffix("].csv")
                    .or_else(|| token.strip_suffix(']'))
                    .unwrap_or(token)
            })
            .collect();

        if tokens.len() < 4 {
            return Err(SessionError::FilenameFormatError {
                file_name: file_name.to_string(),
                reason: format!("expected at least 4 tokens, found {}", tokens.len()),
            });
        }

        let session_start =
            tokens[0]
                .parse::<i64>()
                .map_err(|e| SessionError::FilenameFormatError {
                    file_name: file_name.to_string(),
                    reason: format!("session start '{}' is not an epoch: {}", tokens[0], e),
                })?;

        Ok(Self {
            session_start,
            mission_name: tokens[1].to_string(),
            player_name: tokens[2].to_string(),
            player_id: tokens[3].to_string(),
        })
    }
}
