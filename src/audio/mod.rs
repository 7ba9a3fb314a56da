//! # Audio Module
//!
//! Playback state for Prefix Player.
//!
//! ## Architecture
//!
//! ### [`player`] - Playback Controller
//! - Owns the single audio player shared by every guild
//! - Serializes play/stop/pause/resume/skip/volume
//! - Binds the player to one voice connection at a time and releases it
//!
//! ### [`voice`] - Voice Transport
//! - [`voice::VoiceTransport`] and [`voice::TrackControl`] seams
//! - Songbird implementation used in production
//!
//! ### [`queue`] - Queue Store
//! - Per-guild list of requested URLs, never consumed by playback
//!
//! ## Single tenancy
//!
//! Starting playback in one guild stops whatever was playing in another.
//! Concurrent multi-guild playback is not supported.

pub mod player;
pub mod queue;
pub mod voice;

#[cfg(test)]
pub mod testing;
