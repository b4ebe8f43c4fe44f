// Playback queue
//
// The playback engine consumes the playlist through its change stream. This
// module keeps the part of that engine that does not touch audio devices:
// the play order, the current item, shuffle and repeat.

pub mod queue;

pub use queue::PlaybackQueue;
