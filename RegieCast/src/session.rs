//! Le chemin de commande unique de la régie.
//!
//! Chaque commande client est appliquée entièrement à la playlist
//! (mutex tokio, en mémoire) avant que le handler ne réponde. Les envois
//! réseau vers les renderers sont déjà partis dans les files des cibles et
//! ne sont jamais attendus : un renderer lent rattrape son retard par
//! resynchronisation, pas en retenant la réponse au client.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use rgcplaylist::{
    CitationStyle, ClientSnapshot, ItemContext, ItemProps, Playlist, PsalmLibrary, RenderSink,
    Result, SongLibrary,
};

use crate::broadcast::{EventBus, SessionEvent};

pub struct Session {
    playlist: Mutex<Playlist>,
    sink: Arc<dyn RenderSink>,
    events: EventBus,
    citation_style: CitationStyle,
    songs: Box<dyn SongLibrary>,
    psalms: Box<dyn PsalmLibrary>,
    default_language: String,
}

impl Session {
    pub fn new(
        sink: Arc<dyn RenderSink>,
        songs: Box<dyn SongLibrary>,
        psalms: Box<dyn PsalmLibrary>,
    ) -> Self {
        let config = rgcconfig::get_config();

        // Le style de citation est parsé une seule fois, au démarrage.
        let style_template = config.get_citation_style();
        let citation_style = match CitationStyle::parse(&style_template) {
            Ok(style) => style,
            Err(err) => {
                warn!(template = %style_template, "Invalid citation style, using default: {}", err);
                CitationStyle::default()
            }
        };

        Self {
            playlist: Mutex::new(Playlist::new(Arc::clone(&sink))),
            sink,
            events: EventBus::new(),
            citation_style,
            songs,
            psalms,
            default_language: config.get_default_song_language(),
        }
    }

    fn ctx(&self) -> ItemContext<'_> {
        ItemContext {
            citation_style: &self.citation_style,
            songs: self.songs.as_ref(),
            psalms: self.psalms.as_ref(),
            default_language: &self.default_language,
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ClientSnapshot {
        self.playlist.lock().await.create_client_snapshot()
    }

    fn publish(&self, playlist: &Playlist) {
        self.events.notify(playlist.create_client_snapshot());
    }

    pub async fn replace_playlist(&self, caption: String, items: Vec<ItemProps>) {
        let mut playlist = self.playlist.lock().await;
        playlist.replace(caption, items, &self.ctx());
        self.publish(&playlist);
    }

    pub async fn add_item(
        &self,
        props: ItemProps,
        index: Option<i64>,
        set_active: bool,
    ) -> Result<usize> {
        let mut playlist = self.playlist.lock().await;
        let idx = playlist.add_item(props, index, set_active, &self.ctx())?;
        self.publish(&playlist);
        Ok(idx)
    }

    pub async fn update_item(&self, position: i64, props: ItemProps) -> Result<()> {
        let mut playlist = self.playlist.lock().await;
        playlist.update_item(position, props, &self.ctx())?;
        self.publish(&playlist);
        Ok(())
    }

    pub async fn delete_item(&self, position: i64) -> Result<bool> {
        let mut playlist = self.playlist.lock().await;
        let active_changed = playlist.delete_item(position)?;
        self.publish(&playlist);
        Ok(active_changed)
    }

    pub async fn move_item(&self, from: i64, to: i64) -> Result<Vec<usize>> {
        let mut playlist = self.playlist.lock().await;
        let permutation = playlist.move_item(from, to)?;
        self.publish(&playlist);
        Ok(permutation)
    }

    /// Un échec (index invalide, item non affichable) ne diffuse rien :
    /// aucun état n'a changé.
    pub async fn set_active(&self, item: i64, slide: i64) -> Result<()> {
        let mut playlist = self.playlist.lock().await;
        playlist.set_active_item(item, slide)?;
        self.publish(&playlist);
        Ok(())
    }

    pub async fn set_active_slide(&self, slide: i64) -> Result<usize> {
        let mut playlist = self.playlist.lock().await;
        let resolved = playlist.set_active_slide(slide)?;
        self.publish(&playlist);
        Ok(resolved)
    }

    pub async fn navigate_item(&self, steps: i64) -> Result<()> {
        let mut playlist = self.playlist.lock().await;
        playlist.navigate_item(steps, 0)?;
        self.publish(&playlist);
        Ok(())
    }

    pub async fn navigate_slide(&self, steps: i64) -> Result<bool> {
        let mut playlist = self.playlist.lock().await;
        let item_changed = playlist.navigate_slide(steps)?;
        self.publish(&playlist);
        Ok(item_changed)
    }

    pub async fn set_visibility(&self, visible: bool) {
        let playlist = self.playlist.lock().await;
        self.sink.set_visibility(visible);
        self.publish(&playlist);
    }

    /// Signalement de pages rasterisées (collaborateur PDF externe).
    pub async fn add_rasterized_pages(&self, position: i64, pages: usize) -> Result<bool> {
        let mut playlist = self.playlist.lock().await;
        let flipped = playlist.add_rasterized_pages(position, pages)?;
        if flipped {
            self.publish(&playlist);
        }
        Ok(flipped)
    }
}
