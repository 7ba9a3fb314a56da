use anyhow::Result;
use async_trait::async_trait;
use songbird::input::{HttpRequest, Input, YoutubeDl};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{ResolvedStream, StreamKind, StreamResolver};
use crate::error::PlaybackError;

const AUDIO_EXTENSIONS: [&str; 7] = [".mp3", ".wav", ".ogg", ".flac", ".m4a", ".opus", ".webm"];

/// Resolver basado en yt-dlp con descarga HTTP directa para archivos de audio
pub struct YtDlpResolver {
    client: reqwest::Client,
}

impl YtDlpResolver {
    pub fn new() -> Result<Self> {
        // Sin timeout global: el stream se descarga mientras suena
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client })
    }

    /// Decides how `raw` should be fetched, rejecting anything that is not
    /// an absolute http(s) URL.
    pub fn classify(raw: &str) -> Result<StreamKind, PlaybackError> {
        let url = Url::parse(raw.trim())
            .map_err(|e| PlaybackError::Resolver(format!("URL inválida {:?}: {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PlaybackError::Resolver(format!(
                "esquema no soportado: {}",
                url.scheme()
            )));
        }

        let path = url.path().to_lowercase();
        if AUDIO_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            Ok(StreamKind::DirectHttp)
        } else {
            Ok(StreamKind::Ytdl)
        }
    }
}

#[async_trait]
impl StreamResolver for YtDlpResolver {
    type Input = Input;

    async fn resolve(&self, url: &str) -> Result<ResolvedStream<Input>, PlaybackError> {
        let url = url.trim();
        let kind = Self::classify(url)?;
        debug!("🔎 Resolviendo {} como {:?}", url, kind);

        match kind {
            StreamKind::Ytdl => {
                let mut input: Input = YoutubeDl::new(self.client.clone(), url.to_string()).into();

                // yt-dlp falla aquí para URLs inexistentes o no soportadas
                let metadata = input.aux_metadata().await.map_err(|e| {
                    warn!("❌ yt-dlp no pudo resolver {}: {:?}", url, e);
                    PlaybackError::Resolver(format!("{:?}", e))
                })?;

                info!(
                    "✅ Resuelto con yt-dlp: {}",
                    metadata.title.as_deref().unwrap_or(url)
                );

                Ok(ResolvedStream {
                    input,
                    kind,
                    title: metadata.title,
                })
            }
            StreamKind::DirectHttp => {
                let input: Input = HttpRequest::new(self.client.clone(), url.to_string()).into();
                info!("🎯 Usando URL directa de audio: {}", url);

                Ok(ResolvedStream {
                    input,
                    kind,
                    title: None,
                })
            }
        }
    }
}
