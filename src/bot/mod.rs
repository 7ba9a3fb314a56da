//! # Bot Module
//!
//! Serenity event handler for Prefix Player.
//!
//! This module contains:
//! - Prefix command parsing ([`commands`])
//! - Command execution against the playback controller ([`handlers`])
//! - Gateway events (ready, messages, voice state updates)
//!
//! ## Architecture
//!
//! [`MusicBot`] implements Serenity's [`EventHandler`] trait and holds the
//! process-wide context every command needs:
//!
//! - The shared [`PlaybackController`]
//! - The per-guild [`QueueStore`]
//! - The command prefix
//!
//! Each message is handled to completion on its own task. Errors never
//! escape the handler: they are logged and, where relevant, answered with a
//! generic reply.

use serenity::{
    all::{ActivityData, ChannelId, Context, EventHandler, Message, Ready, VoiceState},
    async_trait,
};
use std::sync::Arc;
use tracing::{error, info};

pub mod commands;
pub mod handlers;

use crate::{
    audio::{player::PlaybackController, queue::QueueStore, voice::SongbirdTransport},
    sources::YtDlpResolver,
};

use self::handlers::Invocation;

/// Controller wired to songbird and yt-dlp.
pub type Controller = PlaybackController<SongbirdTransport, YtDlpResolver>;

/// Main Discord event handler.
///
/// ## Thread Safety
///
/// - [`Arc`] for the controller, also held by the shutdown task
/// - [`QueueStore`] uses a [`dashmap::DashMap`] internally
pub struct MusicBot {
    prefix: char,
    controller: Arc<Controller>,
    queues: Arc<QueueStore>,
}

impl MusicBot {
    pub fn new(prefix: char, controller: Arc<Controller>, queues: Arc<QueueStore>) -> Self {
        Self {
            prefix,
            controller,
            queues,
        }
    }
}

#[async_trait]
impl EventHandler for MusicBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        ctx.set_activity(Some(ActivityData::listening(format!("{}play", self.prefix))));
    }

    /// Handles prefixed text commands.
    ///
    /// Messages from bots, messages without the prefix and unknown commands
    /// are dropped without a reply.
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(command) = commands::parse(self.prefix, &msg.content) else {
            return;
        };

        let invocation = Invocation {
            author: msg.author.name.clone(),
            guild_id: msg.guild_id,
            voice_channel: author_voice_channel(&ctx, &msg),
        };

        let reply = handlers::execute(
            command,
            &invocation,
            self.controller.as_ref(),
            self.queues.as_ref(),
        )
        .await;

        if let Err(e) = msg.reply(&ctx, reply).await {
            error!("Error al responder en canal {}: {:?}", msg.channel_id, e);
        }
    }

    /// Drops the voice binding when the bot is disconnected from outside
    /// (kicked, channel deleted, ...).
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let current_user_id = ctx.cache.current_user().id;
        if new.user_id != current_user_id || new.channel_id.is_some() {
            return;
        }
        let Some(old_channel) = old.and_then(|old| old.channel_id) else {
            return;
        };

        if let Some(guild_id) = new.guild_id {
            info!("🔌 Bot desconectado del canal {} en guild {}", old_channel, guild_id);
            self.controller
                .connection_lost(guild_id, old_channel)
                .await;
        }
    }
}

/// Voice channel the message author is connected to in the message's guild.
fn author_voice_channel(ctx: &Context, msg: &Message) -> Option<ChannelId> {
    let guild = msg.guild(&ctx.cache)?;

    guild
        .voice_states
        .get(&msg.author.id)
        .and_then(|voice_state| voice_state.channel_id)
}
