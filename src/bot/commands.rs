use tracing::debug;

/// A recognized text command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// All remaining arguments joined with single spaces.
    Play { url: String },
    Stop,
    Pause,
    Resume,
    Skip,
    Queue,
    /// First argument only, if present.
    Volume { percent: Option<String> },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Play { .. } => "play",
            Command::Stop => "stop",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Skip => "skip",
            Command::Queue => "queue",
            Command::Volume { .. } => "volume",
        }
    }
}

/// Parses `content` into a [`Command`].
///
/// Returns `None` when the message does not start with `prefix` or names no
/// known command. The command name is case-insensitive; whitespace runs
/// between tokens are collapsed.
pub fn parse(prefix: char, content: &str) -> Option<Command> {
    let body = content.strip_prefix(prefix)?;
    let mut tokens = body.split_whitespace();
    let name = tokens.next()?.to_lowercase();

    let command = match name.as_str() {
        "play" => Command::Play {
            url: tokens.collect::<Vec<_>>().join(" "),
        },
        "stop" => Command::Stop,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "skip" => Command::Skip,
        "queue" => Command::Queue,
        "volume" => Command::Volume {
            percent: tokens.next().map(str::to_string),
        },
        other => {
            debug!("Comando ignorado: {}", other);
            return None;
        }
    };

    Some(command)
}
