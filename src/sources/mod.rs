//! # Sources
//!
//! Turns a user supplied URL into something the voice transport can play.
//! The only implementation shipped is [`YtDlpResolver`], which hands page
//! URLs to yt-dlp and streams direct audio file links over HTTP.

pub mod ytdlp;

use async_trait::async_trait;

use crate::error::PlaybackError;

pub use ytdlp::YtDlpResolver;

/// How a resolved stream will be fetched once playback starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Extracted by yt-dlp (YouTube, SoundCloud, ...)
    Ytdl,
    /// Plain HTTP download of an audio file
    DirectHttp,
}

/// A playable input together with what is known about it.
pub struct ResolvedStream<I> {
    pub input: I,
    pub kind: StreamKind,
    pub title: Option<String>,
}

/// Trait común para los resolvers de URLs
#[cfg_attr(test, mockall::automock(type Input = String;))]
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Input handed to the voice transport.
    type Input: Send + 'static;

    /// Resolves `url`, failing for unsupported or unreachable URLs.
    async fn resolve(&self, url: &str) -> Result<ResolvedStream<Self::Input>, PlaybackError>;
}
