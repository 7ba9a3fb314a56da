use dashmap::DashMap;
use serenity::model::id::GuildId;
use tracing::{debug, info};

/// Per-guild list of requested track URLs, in request order.
///
/// Playback never reads from this store: `play` appends to it and nothing
/// dequeues. Sequences grow without bound until cleared.
#[derive(Debug, Default)]
pub struct QueueStore {
    queues: DashMap<GuildId, Vec<String>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self {
            queues: DashMap::new(),
        }
    }

    /// Agrega una URL al final de la cola del guild
    pub fn add_to_queue(&self, guild_id: GuildId, url: impl Into<String>) {
        let url = url.into();
        let mut queue = self.queues.entry(guild_id).or_default();
        queue.push(url);
        info!(
            "➕ Agregado a la cola de guild {} (posición {})",
            guild_id,
            queue.len() - 1
        );
    }

    /// Copia de la cola actual; vacía si el guild no tiene entrada
    #[allow(dead_code)]
    pub fn get_queue(&self, guild_id: GuildId) -> Vec<String> {
        self.queues
            .get(&guild_id)
            .map(|queue| queue.clone())
            .unwrap_or_default()
    }

    /// Elimina la entrada completa del guild
    #[allow(dead_code)]
    pub fn clear_queue(&self, guild_id: GuildId) {
        if self.queues.remove(&guild_id).is_some() {
            info!("🗑️ Cola limpiada para guild {}", guild_id);
        }
    }

    /// Elimina el elemento en `index`; fuera de rango no hace nada
    #[allow(dead_code)]
    pub fn remove_from_queue(&self, guild_id: GuildId, index: usize) {
        if let Some(mut queue) = self.queues.get_mut(&guild_id) {
            if index < queue.len() {
                queue.remove(index);
                debug!("❌ Track eliminado en posición {} (guild {})", index, guild_id);
            }
        }
    }
}
