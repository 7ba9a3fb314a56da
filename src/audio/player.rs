use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::{
    audio::voice::{TrackControl, VoiceTransport},
    error::PlaybackError,
    sources::StreamResolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Playing,
    Paused,
}

/// What the shared player is currently bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub url: String,
    pub title: Option<String>,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

/// Observable state of the single process-wide player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub status: PlayerStatus,
    /// Fraction between 0.0 and 1.0.
    pub volume: f32,
    pub now_playing: Option<NowPlaying>,
    /// Bumped on every successful `play`.
    pub generation: u64,
    /// URLs started by `play`, oldest first, capped at [`MAX_HISTORY`].
    pub history: Vec<String>,
}

/// Played URLs kept in [`PlayerState::history`].
pub const MAX_HISTORY: usize = 50;

impl PlayerState {
    fn new(volume: f32) -> Self {
        Self {
            status: PlayerStatus::Idle,
            volume,
            now_playing: None,
            generation: 0,
            history: Vec::new(),
        }
    }

    fn add_to_history(&mut self, url: String) {
        self.history.push(url);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }

    fn reset(&mut self) {
        self.status = PlayerStatus::Idle;
        self.now_playing = None;
    }
}

/// Volume requested by a user, as an integer percentage 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume(u8);

impl Volume {
    pub const MAX_PERCENT: u8 = 100;

    /// Reads the leading integer of `raw`, ignoring anything after it, so
    /// `"50%"` is 50 and `"12.5"` is 12.
    pub fn parse(raw: &str) -> Result<Self, PlaybackError> {
        let invalid = || PlaybackError::InvalidVolume(raw.to_string());

        let trimmed = raw.trim();
        let unsigned = trimmed.trim_start_matches(['+', '-']);
        let sign_len = trimmed.len() - unsigned.len();
        if sign_len > 1 {
            return Err(invalid());
        }

        let digits_len = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        if digits_len == 0 {
            return Err(invalid());
        }

        // Un número enorme cuenta como fuera de rango
        let percent = trimmed[..sign_len + digits_len]
            .parse::<i64>()
            .unwrap_or(i64::MAX);

        u8::try_from(percent)
            .ok()
            .filter(|percent| *percent <= Self::MAX_PERCENT)
            .map(Volume)
            .ok_or_else(invalid)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

/// Flips the player back to idle when the track it was created for ends.
///
/// Holds only a weak reference, so a pending hook never keeps the player
/// alive. Hooks from a preempted track see a newer generation and do nothing.
pub struct FinishHook {
    state: Weak<Mutex<PlayerState>>,
    generation: u64,
}

impl FinishHook {
    pub fn fire(&self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };

        let mut state = state.lock();
        if state.generation == self.generation && state.status != PlayerStatus::Idle {
            info!("🏁 Track terminado, reproductor inactivo");
            state.reset();
        }
    }
}

struct VoiceBinding<T> {
    guild_id: GuildId,
    channel_id: ChannelId,
    track: T,
}

/// The one audio player shared by every guild.
///
/// Only one guild can be heard at a time: `play` from guild B stops guild
/// A's track and releases A's voice connection. State changing operations
/// are serialized on the binding lock, which is held across voice calls but
/// never across URL resolution.
pub struct PlaybackController<V: VoiceTransport, R> {
    transport: V,
    resolver: R,
    state: Arc<Mutex<PlayerState>>,
    binding: tokio::sync::Mutex<Option<VoiceBinding<V::Track>>>,
}

impl<V, R> PlaybackController<V, R>
where
    V: VoiceTransport,
    R: StreamResolver<Input = V::Input>,
{
    pub fn new(transport: V, resolver: R, default_volume: f32) -> Self {
        Self {
            transport,
            resolver,
            state: Arc::new(Mutex::new(PlayerState::new(default_volume.clamp(0.0, 1.0)))),
            binding: tokio::sync::Mutex::new(None),
        }
    }

    /// Starts `url` in the caller's voice channel, preempting anything
    /// playing in any guild.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NoVoiceChannel`] when `voice_channel` is `None`;
    ///   nothing is touched.
    /// - [`PlaybackError::Resolver`] when the URL cannot be resolved; the
    ///   current playback keeps going.
    /// - [`PlaybackError::Connection`] when joining or starting fails; the
    ///   player ends up idle.
    pub async fn play(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        url: &str,
    ) -> Result<NowPlaying, PlaybackError> {
        let channel_id = voice_channel.ok_or(PlaybackError::NoVoiceChannel)?;

        let resolved = self.resolver.resolve(url).await?;
        debug!("Stream {:?} listo para {}", resolved.kind, url);

        let mut binding = self.binding.lock().await;

        // Detener lo que esté sonando, en cualquier guild
        if let Some(previous) = binding.take() {
            if let Err(e) = previous.track.stop() {
                debug!("Track anterior ya detenido: {}", e);
            }
            if previous.guild_id != guild_id {
                info!(
                    "⏏️ Guild {} desplazado por guild {}",
                    previous.guild_id, guild_id
                );
                self.leave(previous.guild_id).await;
            }
        }

        if let Err(e) = self.transport.join(guild_id, channel_id).await {
            self.leave(guild_id).await;
            self.state.lock().reset();
            return Err(e);
        }

        let volume = self.state.lock().volume;
        let track = match self.transport.start(guild_id, resolved.input, volume).await {
            Ok(track) => track,
            Err(e) => {
                self.leave(guild_id).await;
                self.state.lock().reset();
                return Err(e);
            }
        };

        let now_playing = NowPlaying {
            url: url.trim().to_string(),
            title: resolved.title,
            guild_id,
            channel_id,
        };

        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.status = PlayerStatus::Playing;
            state.now_playing = Some(now_playing.clone());
            state.add_to_history(now_playing.url.clone());
            state.generation
        };

        let hook = FinishHook {
            state: Arc::downgrade(&self.state),
            generation,
        };
        if let Err(e) = track.on_finish(hook) {
            warn!("No se pudo registrar fin de track: {}", e);
        }

        *binding = Some(VoiceBinding {
            guild_id,
            channel_id,
            track,
        });

        info!(
            "🎵 Reproduciendo {} en canal {} (guild {})",
            now_playing.title.as_deref().unwrap_or(&now_playing.url),
            channel_id,
            guild_id
        );
        Ok(now_playing)
    }

    /// Stops playback and releases the voice connection. Idempotent.
    pub async fn stop(&self) {
        let mut binding = self.binding.lock().await;
        self.release(binding.take()).await;
        self.state.lock().reset();
        info!("⏹️ Reproducción detenida");
    }

    /// Same as [`stop`](Self::stop): nothing is dequeued.
    pub async fn skip(&self) {
        let mut binding = self.binding.lock().await;
        self.release(binding.take()).await;
        self.state.lock().reset();
        info!("⏭️ Track saltado");
    }

    /// Pausa la reproducción actual; no hace nada si no está sonando
    pub async fn pause(&self) {
        let binding = self.binding.lock().await;
        let mut state = self.state.lock();

        if state.status != PlayerStatus::Playing {
            return;
        }
        if let Some(bound) = binding.as_ref() {
            if let Err(e) = bound.track.pause() {
                warn!("Error al pausar: {}", e);
                return;
            }
        }

        state.status = PlayerStatus::Paused;
        info!("⏸️ Reproducción pausada");
    }

    /// Reanuda la reproducción; no hace nada si no está pausada
    pub async fn resume(&self) {
        let binding = self.binding.lock().await;
        let mut state = self.state.lock();

        if state.status != PlayerStatus::Paused {
            return;
        }
        if let Some(bound) = binding.as_ref() {
            if let Err(e) = bound.track.resume() {
                warn!("Error al reanudar: {}", e);
                return;
            }
        }

        state.status = PlayerStatus::Playing;
        info!("▶️ Reproducción reanudada");
    }

    /// Stores the volume and applies it to the live track, if any. New
    /// tracks start at the stored volume.
    pub async fn set_volume(&self, volume: Volume) {
        let binding = self.binding.lock().await;

        if let Some(bound) = binding.as_ref() {
            if let Err(e) = bound.track.set_volume(volume.fraction()) {
                warn!("Error al ajustar volumen: {}", e);
            }
        }

        self.state.lock().volume = volume.fraction();
        info!("🔊 Volumen ajustado a {}%", volume.percent());
    }

    /// Called when the bot was disconnected from `channel_id` in `guild_id`
    /// from outside. Stale events for a channel the player already moved
    /// away from are ignored.
    pub async fn connection_lost(&self, guild_id: GuildId, channel_id: ChannelId) {
        let mut binding = self.binding.lock().await;

        if let Some(bound) = binding.take_if(|bound| {
            bound.guild_id == guild_id && bound.channel_id == channel_id
        }) {
            info!("🔌 Conexión perdida en guild {}, deteniendo", guild_id);
            self.release(Some(bound)).await;
            self.state.lock().reset();
        }
    }

    /// Releases the voice connection before the process exits.
    pub async fn shutdown(&self) {
        let mut binding = self.binding.lock().await;
        self.release(binding.take()).await;
        self.state.lock().reset();
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state.lock().clone()
    }

    async fn release(&self, binding: Option<VoiceBinding<V::Track>>) {
        let Some(bound) = binding else {
            return;
        };

        if let Err(e) = bound.track.stop() {
            debug!("Track ya detenido: {}", e);
        }
        self.leave(bound.guild_id).await;
    }

    async fn leave(&self, guild_id: GuildId) {
        if let Err(e) = self.transport.leave(guild_id).await {
            warn!("Error al salir del canal de voz en guild {}: {}", guild_id, e);
        }
    }
}
