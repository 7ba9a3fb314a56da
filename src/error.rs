//! Error types shared by the playback controller, the resolver and the
//! command handlers.

use thiserror::Error;

/// Everything that can go wrong while handling a playback command.
///
/// Validation variants ([`NoVoiceChannel`](PlaybackError::NoVoiceChannel),
/// [`InvalidVolume`](PlaybackError::InvalidVolume)) get a specific reply in
/// chat. The rest are upstream failures: they are logged with their detail
/// and the user only sees a generic failure notice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("el usuario no está en un canal de voz")]
    NoVoiceChannel,

    /// Carries the raw argument as typed by the user.
    #[error("volumen inválido: {0:?}")]
    InvalidVolume(String),

    /// The URL could not be turned into a playable stream.
    #[error("error del resolver: {0}")]
    Resolver(String),

    /// Joining the voice channel or starting the track failed.
    #[error("error de conexión de voz: {0}")]
    Connection(String),

    /// A control call (pause, volume...) on a live track failed. Only logged.
    #[error("error de control del track: {0}")]
    Control(String),
}
