use dcsstats_events::TypedEvent;
use tracing::warn;

use crate::roster::Player;
use crate::types::Session;
use crate::PlayTimeError;

/// Seconds between the connect that opens a session and the disconnect that
/// closes it.
pub fn session_play_time(session: &Session) -> Result<i64, PlayTimeError> {
    let (first, last) = match session.events() {
        [] => return Err(PlayTimeError::Empty),
        [only] => (only, only),
        [first, .., last] => (first, last),
    };

    let connect = match TypedEvent::try_from(first) {
        Ok(TypedEvent::Connect(connect)) => connect,
        Ok(other) => return Err(PlayTimeError::MissingConnect(other.kind().to_string())),
        Err(e) => return Err(PlayTimeError::MissingConnect(e.to_string())),
    };

    let disconnect = match TypedEvent::try_from(last) {
        Ok(TypedEvent::Disconnect(disconnect)) => disconnect,
        Ok(other) => return Err(PlayTimeError::MissingDisconnect(other.kind().to_string())),
        Err(e) => return Err(PlayTimeError::MissingDisconnect(e.to_string())),
    };

    let (connect, disconnect) = (connect.header.time, disconnect.header.time);
    disconnect
        .checked_sub(connect)
        .ok_or(PlayTimeError::OutOfRange {
            connect,
            disconnect,
        })
}

/// Sum of play time over a player's sessions.
///
/// Sessions without a connect/disconnect pair are logged and left out.
/// The sum saturates instead of wrapping.
pub fn total_play_time(player: &Player) -> i64 {
    player
        .sessions
        .iter()
        .filter_map(|session| match session_play_time(session) {
            Ok(secs) => Some(secs),
            Err(e) => {
                warn!(
                    path = %session.path().display(),
                    player = %player.id,
                    "Could not handle play time file: {}",
                    e
                );
                None
            }
        })
        .fold(0i64, i64::saturating_add)
}
