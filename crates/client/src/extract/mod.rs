//! Text extraction helpers for archive content.
//!
//! - `links`: hrefs out of directory listing markup
//! - `normalize`: raw transcript to one display line
//! - `keywords`: severity tier matching over normalized lines

pub mod keywords;
pub mod links;
pub mod normalize;

pub use keywords::KeywordMatcher;
pub use links::extract_hrefs;
pub use normalize::{NO_AUDIO, NO_TRANSCRIPT, normalize_transcript};
