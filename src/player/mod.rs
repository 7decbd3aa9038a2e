//! Player core: video-source resolution and navigation state.

pub mod navigation;
pub mod source;

pub use navigation::{PlayerNavigator, PlayerSelection};
pub use source::{SourceKind, VideoSource, VideoSourceResolver};
