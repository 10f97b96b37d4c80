pub mod lyrics_panel;
pub mod progress_bar;
pub mod status_bar;

pub use lyrics_panel::LyricsPanel;
pub use progress_bar::ProgressBar;
pub use status_bar::{SourceStatus, StatusBar, StatusInfo};
