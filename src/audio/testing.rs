//! In-memory voice transport used by the controller and handler tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    audio::{
        player::FinishHook,
        voice::{TrackControl, VoiceTransport},
    },
    error::PlaybackError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceCall {
    Join(GuildId, ChannelId),
    Start(GuildId, String),
    Leave(GuildId),
}

#[derive(Default)]
struct TrackInner {
    paused: bool,
    stopped: bool,
    volume: f32,
    hook: Option<FinishHook>,
}

#[derive(Clone, Default)]
pub struct FakeTrack {
    inner: Arc<Mutex<TrackInner>>,
}

impl FakeTrack {
    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.lock().stopped
    }

    pub fn volume(&self) -> f32 {
        self.inner.lock().volume
    }

    /// Simulates the track reaching its end.
    pub fn finish(&self) {
        let hook = self.inner.lock().hook.take();
        if let Some(hook) = hook {
            hook.fire();
        }
    }
}

impl TrackControl for FakeTrack {
    fn pause(&self) -> Result<(), PlaybackError> {
        self.inner.lock().paused = true;
        Ok(())
    }

    fn resume(&self) -> Result<(), PlaybackError> {
        self.inner.lock().paused = false;
        Ok(())
    }

    fn stop(&self) -> Result<(), PlaybackError> {
        self.inner.lock().stopped = true;
        Ok(())
    }

    fn set_volume(&self, fraction: f32) -> Result<(), PlaybackError> {
        self.inner.lock().volume = fraction;
        Ok(())
    }

    fn on_finish(&self, hook: FinishHook) -> Result<(), PlaybackError> {
        self.inner.lock().hook = Some(hook);
        Ok(())
    }
}

/// Records every call and hands out [`FakeTrack`]s in start order.
#[derive(Clone, Default)]
pub struct FakeTransport {
    calls: Arc<Mutex<Vec<VoiceCall>>>,
    tracks: Arc<Mutex<Vec<FakeTrack>>>,
    fail_join: Arc<AtomicBool>,
    fail_start: Arc<AtomicBool>,
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<VoiceCall> {
        self.calls.lock().clone()
    }

    /// The `index`-th track started through this transport.
    pub fn track(&self, index: usize) -> FakeTrack {
        self.tracks.lock()[index].clone()
    }

    pub fn fail_joins(&self) {
        self.fail_join.store(true, Ordering::SeqCst);
    }

    pub fn fail_starts(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoiceTransport for FakeTransport {
    type Input = String;
    type Track = FakeTrack;

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), PlaybackError> {
        if self.fail_join.load(Ordering::SeqCst) {
            return Err(PlaybackError::Connection("join rechazado".to_string()));
        }
        self.calls.lock().push(VoiceCall::Join(guild_id, channel_id));
        Ok(())
    }

    async fn start(
        &self,
        guild_id: GuildId,
        input: String,
        volume: f32,
    ) -> Result<FakeTrack, PlaybackError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(PlaybackError::Connection("start rechazado".to_string()));
        }
        self.calls.lock().push(VoiceCall::Start(guild_id, input));

        let track = FakeTrack::default();
        track.inner.lock().volume = volume;
        self.tracks.lock().push(track.clone());
        Ok(track)
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        self.calls.lock().push(VoiceCall::Leave(guild_id));
        Ok(())
    }
}
