pub mod grouping;
pub mod playback;
