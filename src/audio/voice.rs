use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::{
    error::JoinError,
    input::Input,
    tracks::{ControlError, TrackHandle},
    Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{audio::player::FinishHook, error::PlaybackError};

/// Controls a single playing track.
///
/// Every method maps to one control message; none of them wait for the
/// track to acknowledge it.
pub trait TrackControl: Send + Sync + 'static {
    fn pause(&self) -> Result<(), PlaybackError>;
    fn resume(&self) -> Result<(), PlaybackError>;
    fn stop(&self) -> Result<(), PlaybackError>;
    fn set_volume(&self, fraction: f32) -> Result<(), PlaybackError>;

    /// Runs `hook` once the track ends, whether stopped or finished.
    fn on_finish(&self, hook: FinishHook) -> Result<(), PlaybackError>;
}

/// Voice connections, one per guild.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    type Input: Send + 'static;
    type Track: TrackControl;

    /// Joins (or moves to) `channel_id` in `guild_id`.
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), PlaybackError>;

    /// Replaces whatever the guild's connection is playing with `input`.
    async fn start(
        &self,
        guild_id: GuildId,
        input: Self::Input,
        volume: f32,
    ) -> Result<Self::Track, PlaybackError>;

    /// Leaves the guild's voice channel. Leaving a guild without a
    /// connection is not an error.
    async fn leave(&self, guild_id: GuildId) -> Result<(), PlaybackError>;
}

/// [`VoiceTransport`] backed by the songbird manager registered on the
/// serenity client.
pub struct SongbirdTransport {
    manager: Arc<Songbird>,
}

impl SongbirdTransport {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl VoiceTransport for SongbirdTransport {
    type Input = Input;
    type Track = TrackHandle;

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), PlaybackError> {
        match self.manager.join(guild_id, channel_id).await {
            Ok(_call) => {
                info!("🔊 Conectado al canal de voz {} en guild {}", channel_id, guild_id);
                Ok(())
            }
            Err(e) => {
                error!("Error al obtener handler de voz: {:?}", e);
                Err(PlaybackError::Connection(format!("{:?}", e)))
            }
        }
    }

    async fn start(
        &self,
        guild_id: GuildId,
        input: Input,
        volume: f32,
    ) -> Result<TrackHandle, PlaybackError> {
        let call = self.manager.get(guild_id).ok_or_else(|| {
            PlaybackError::Connection(format!("sin conexión de voz en guild {}", guild_id))
        })?;

        let mut call = call.lock().await;
        let handle = call.play_only_input(input);

        handle.set_volume(volume).map_err(control_error)?;
        handle
            .add_event(Event::Track(TrackEvent::Error), TrackErrorHandler { guild_id })
            .map_err(control_error)?;

        Ok(handle)
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        match self.manager.remove(guild_id).await {
            Ok(()) => {
                info!("👋 Desconectado del canal de voz en guild {}", guild_id);
                Ok(())
            }
            Err(JoinError::NoCall) => Ok(()),
            Err(e) => Err(PlaybackError::Connection(format!("{:?}", e))),
        }
    }
}

impl TrackControl for TrackHandle {
    fn pause(&self) -> Result<(), PlaybackError> {
        TrackHandle::pause(self).map_err(control_error)
    }

    fn resume(&self) -> Result<(), PlaybackError> {
        TrackHandle::play(self).map_err(control_error)
    }

    fn stop(&self) -> Result<(), PlaybackError> {
        TrackHandle::stop(self).map_err(control_error)
    }

    fn set_volume(&self, fraction: f32) -> Result<(), PlaybackError> {
        TrackHandle::set_volume(self, fraction).map_err(control_error)
    }

    fn on_finish(&self, hook: FinishHook) -> Result<(), PlaybackError> {
        self.add_event(Event::Track(TrackEvent::End), TrackEndHandler { hook })
            .map_err(control_error)
    }
}

fn control_error(e: ControlError) -> PlaybackError {
    PlaybackError::Control(format!("{:?}", e))
}

/// Handler para cuando termina un track
struct TrackEndHandler {
    hook: FinishHook,
}

#[async_trait]
impl VoiceEventHandler for TrackEndHandler {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        self.hook.fire();
        None
    }
}

/// Handler para errores de tracks
struct TrackErrorHandler {
    guild_id: GuildId,
}

#[async_trait]
impl VoiceEventHandler for TrackErrorHandler {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(track_list) = ctx {
            for (state, _handle) in track_list.iter() {
                error!(
                    "❌ Error en track para guild {}: {:?}",
                    self.guild_id, state.playing
                );
            }
        }

        None
    }
}
