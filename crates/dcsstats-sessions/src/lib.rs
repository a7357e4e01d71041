pub mod error;
pub mod filename;
pub mod playtime;
pub mod roster;
pub mod sortie;
pub mod store;
pub mod types;

pub use error::{PlayTimeError, SessionError};
pub use filename::FileNameInfo;
pub use playtime::{session_play_time, total_play_time};
pub use roster::{Player, PlayerRoster};
pub use sortie::{reconstruct, LateTerminalPolicy, ReconstructOptions, DEFAULT_GRACE_WINDOW_SECS};
pub use store::{Source, SourceStore};
pub use types::{EndReason, Session, Sortie};
