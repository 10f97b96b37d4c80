mod core;
mod session;

pub use self::core::{App, PlayOptions};
pub use session::{FetchOutcome, LyricSession};
