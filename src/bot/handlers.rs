use serenity::model::id::{ChannelId, GuildId};
use tracing::{debug, error, info};

use crate::{
    audio::{
        player::{PlaybackController, Volume},
        queue::QueueStore,
        voice::VoiceTransport,
    },
    bot::commands::Command,
    error::PlaybackError,
    sources::StreamResolver,
};

/// Textos enviados al canal
pub mod replies {
    pub const NO_VOICE_CHANNEL: &str = "❌ ¡Primero debes unirte a un canal de voz!";
    pub const PLAY_FAILED: &str = "❌ ¡Ocurrió un error durante la reproducción!";
    pub const STOPPED: &str = "⏹️ Reproducción detenida";
    pub const PAUSED: &str = "⏸️ Reproducción pausada";
    pub const RESUMED: &str = "▶️ Reproducción reanudada";
    pub const SKIPPED: &str = "⏭️ Canción actual saltada";
    pub const QUEUE_PENDING: &str = "📋 La función de cola está en desarrollo...";
    pub const INVALID_VOLUME: &str = "❌ Ingresa un volumen válido (0-100)";

    pub fn now_playing(url: &str) -> String {
        format!("🎵 Reproduciendo: {}", url)
    }

    pub fn volume_set(percent: u8) -> String {
        format!("🔊 Volumen ajustado a {}%", percent)
    }
}

/// Who issued a command and where they are.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub author: String,
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    /// The author's current voice channel in `guild_id`, if any.
    pub voice_channel: Option<ChannelId>,
}

/// Runs `command` and returns the reply to send back.
pub async fn execute<V, R>(
    command: Command,
    invocation: &Invocation,
    controller: &PlaybackController<V, R>,
    queues: &QueueStore,
) -> String
where
    V: VoiceTransport,
    R: StreamResolver<Input = V::Input>,
{
    info!(
        "📝 Comando {} usado por {} en guild {:?}",
        command.name(),
        invocation.author,
        invocation.guild_id
    );

    match command {
        Command::Play { url } => handle_play(&url, invocation, controller, queues).await,
        Command::Stop => {
            controller.stop().await;
            replies::STOPPED.to_string()
        }
        Command::Pause => {
            controller.pause().await;
            replies::PAUSED.to_string()
        }
        Command::Resume => {
            controller.resume().await;
            replies::RESUMED.to_string()
        }
        Command::Skip => {
            controller.skip().await;
            replies::SKIPPED.to_string()
        }
        Command::Queue => replies::QUEUE_PENDING.to_string(),
        Command::Volume { percent } => handle_volume(percent.as_deref(), controller).await,
    }
}

async fn handle_play<V, R>(
    url: &str,
    invocation: &Invocation,
    controller: &PlaybackController<V, R>,
    queues: &QueueStore,
) -> String
where
    V: VoiceTransport,
    R: StreamResolver<Input = V::Input>,
{
    // Sin guild no hay canal de voz
    let Some(guild_id) = invocation.guild_id else {
        return replies::NO_VOICE_CHANNEL.to_string();
    };

    match controller
        .play(guild_id, invocation.voice_channel, url)
        .await
    {
        Ok(now_playing) => {
            queues.add_to_queue(guild_id, now_playing.url.clone());
            replies::now_playing(&now_playing.url)
        }
        Err(PlaybackError::NoVoiceChannel) => replies::NO_VOICE_CHANNEL.to_string(),
        Err(e) => {
            error!("Error de reproducción para {:?}: {}", url, e);
            replies::PLAY_FAILED.to_string()
        }
    }
}

async fn handle_volume<V, R>(percent: Option<&str>, controller: &PlaybackController<V, R>) -> String
where
    V: VoiceTransport,
    R: StreamResolver<Input = V::Input>,
{
    match Volume::parse(percent.unwrap_or_default()) {
        Ok(volume) => {
            controller.set_volume(volume).await;
            replies::volume_set(volume.percent())
        }
        Err(e) => {
            debug!("{}", e);
            replies::INVALID_VOLUME.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::{
            player::PlayerStatus,
            testing::{FakeTransport, VoiceCall},
        },
        sources::{MockStreamResolver, ResolvedStream, StreamKind},
    };
    use pretty_assertions::assert_eq;

    type TestController = PlaybackController<FakeTransport, MockStreamResolver>;

    fn setup() -> (TestController, FakeTransport, QueueStore) {
        let transport = FakeTransport::default();
        let mut resolver = MockStreamResolver::new();
        resolver
            .expect_resolve()
            .withf(|url| url.starts_with("https://"))
            .returning(|url| {
                Ok(ResolvedStream {
                    input: url.to_string(),
                    kind: StreamKind::Ytdl,
                    title: Some("Track".to_string()),
                })
            });
        resolver
            .expect_resolve()
            .withf(|url| !url.starts_with("https://"))
            .returning(|url| Err(PlaybackError::Resolver(format!("URL inválida {:?}", url))));

        let controller = PlaybackController::new(transport.clone(), resolver, 1.0);
        (controller, transport, QueueStore::new())
    }

    fn in_voice(guild: u64, channel: u64) -> Invocation {
        Invocation {
            author: "tester".to_string(),
            guild_id: Some(GuildId::new(guild)),
            voice_channel: Some(ChannelId::new(channel)),
        }
    }

    fn not_in_voice(guild: u64) -> Invocation {
        Invocation {
            author: "tester".to_string(),
            guild_id: Some(GuildId::new(guild)),
            voice_channel: None,
        }
    }

    fn play(url: &str) -> Command {
        Command::Play {
            url: url.to_string(),
        }
    }

    fn volume(raw: &str) -> Command {
        Command::Volume {
            percent: Some(raw.to_string()),
        }
    }

    #[tokio::test]
    async fn test_play_replies_and_records_url() {
        let (controller, _transport, queues) = setup();

        let reply = execute(play("https://a.example/x"), &in_voice(1, 10), &controller, &queues).await;

        assert_eq!(reply, replies::now_playing("https://a.example/x"));
        assert_eq!(controller.snapshot().status, PlayerStatus::Playing);
        assert_eq!(
            queues.get_queue(GuildId::new(1)),
            vec!["https://a.example/x".to_string()]
        );
    }

    #[tokio::test]
    async fn test_play_without_voice_channel() {
        let (controller, transport, queues) = setup();

        let reply = execute(play("https://a.example/x"), &not_in_voice(1), &controller, &queues).await;

        assert_eq!(reply, replies::NO_VOICE_CHANNEL);
        assert_eq!(controller.snapshot().status, PlayerStatus::Idle);
        assert!(transport.calls().is_empty());
        assert!(queues.get_queue(GuildId::new(1)).is_empty());
    }

    #[tokio::test]
    async fn test_play_from_direct_message() {
        let (controller, _transport, queues) = setup();
        let dm = Invocation {
            author: "tester".to_string(),
            guild_id: None,
            voice_channel: None,
        };

        let reply = execute(play("https://a.example/x"), &dm, &controller, &queues).await;

        assert_eq!(reply, replies::NO_VOICE_CHANNEL);
    }

    #[tokio::test]
    async fn test_resolver_failure_gets_generic_reply() {
        let (controller, transport, queues) = setup();

        let reply = execute(play("not a url"), &in_voice(1, 10), &controller, &queues).await;

        assert_eq!(reply, replies::PLAY_FAILED);
        assert!(!reply.contains("not a url"));
        assert!(transport.calls().is_empty());
        assert!(queues.get_queue(GuildId::new(1)).is_empty());
    }

    #[tokio::test]
    async fn test_second_guild_takes_over_player() {
        let (controller, transport, queues) = setup();

        execute(play("https://a.example/a"), &in_voice(1, 10), &controller, &queues).await;
        execute(play("https://a.example/b"), &in_voice(2, 20), &controller, &queues).await;

        let state = controller.snapshot();
        assert_eq!(state.status, PlayerStatus::Playing);
        assert_eq!(state.now_playing.map(|now| now.guild_id), Some(GuildId::new(2)));
        assert!(transport.calls().contains(&VoiceCall::Leave(GuildId::new(1))));
    }

    #[tokio::test]
    async fn test_control_commands_reply_unconditionally() {
        let (controller, _transport, queues) = setup();
        let invocation = not_in_voice(1);

        assert_eq!(execute(Command::Stop, &invocation, &controller, &queues).await, replies::STOPPED);
        assert_eq!(execute(Command::Pause, &invocation, &controller, &queues).await, replies::PAUSED);
        assert_eq!(execute(Command::Resume, &invocation, &controller, &queues).await, replies::RESUMED);
        assert_eq!(execute(Command::Skip, &invocation, &controller, &queues).await, replies::SKIPPED);
        assert_eq!(controller.snapshot().status, PlayerStatus::Idle);
    }

    #[tokio::test]
    async fn test_pause_and_resume_after_play() {
        let (controller, _transport, queues) = setup();
        let invocation = in_voice(1, 10);

        execute(play("https://a.example/a"), &invocation, &controller, &queues).await;
        execute(Command::Pause, &invocation, &controller, &queues).await;
        assert_eq!(controller.snapshot().status, PlayerStatus::Paused);

        execute(Command::Resume, &invocation, &controller, &queues).await;
        assert_eq!(controller.snapshot().status, PlayerStatus::Playing);

        execute(Command::Skip, &invocation, &controller, &queues).await;
        assert_eq!(controller.snapshot().status, PlayerStatus::Idle);
    }

    #[tokio::test]
    async fn test_queue_command_does_not_read_store() {
        let (controller, _transport, queues) = setup();
        queues.add_to_queue(GuildId::new(1), "https://a.example/a");

        let reply = execute(Command::Queue, &in_voice(1, 10), &controller, &queues).await;

        assert_eq!(reply, replies::QUEUE_PENDING);
    }

    #[tokio::test]
    async fn test_volume_validation() {
        let (controller, _transport, queues) = setup();
        let invocation = not_in_voice(1);

        let reply = execute(volume("50"), &invocation, &controller, &queues).await;
        assert_eq!(reply, replies::volume_set(50));
        assert_eq!(controller.snapshot().volume, 0.5);

        for raw in ["150", "-5", "abc"] {
            let reply = execute(volume(raw), &invocation, &controller, &queues).await;
            assert_eq!(reply, replies::INVALID_VOLUME);
            assert_eq!(controller.snapshot().volume, 0.5);
        }

        let reply = execute(volume("25%"), &invocation, &controller, &queues).await;
        assert_eq!(reply, replies::volume_set(25));
        assert_eq!(controller.snapshot().volume, 0.25);

        let reply = execute(volume("12.5"), &invocation, &controller, &queues).await;
        assert_eq!(reply, replies::volume_set(12));
        assert_eq!(controller.snapshot().volume, 0.12);

        let reply = execute(Command::Volume { percent: None }, &invocation, &controller, &queues).await;
        assert_eq!(reply, replies::INVALID_VOLUME);
    }
}
