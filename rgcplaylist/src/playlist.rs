//! La playlist : collection ordonnée d'items + pointeur actif.
//!
//! Machine à états de navigation et de mutation. Les indices sont la seule
//! identité des items (aucun id stable ne survit à un move/delete). Toute
//! mutation passe par le chemin de commande unique ; les poussées vers les
//! renderers partent par le [`RenderSink`] reçu à la construction et ne
//! bloquent jamais.

use std::sync::Arc;

use tracing::warn;

use crate::error::{PlaylistError, Result};
use crate::item::{ItemContext, ItemProps, PlaylistItem};
use crate::sink::RenderSink;
use crate::snapshot::{ActiveItemSlide, ClientSnapshot};

pub struct Playlist {
    items: Vec<PlaylistItem>,
    /// Invariant : pointe un item affichable quand il est posé par
    /// `set_active_item` ; après un `delete_item` il peut rester en simple
    /// curseur de position jusqu'à la navigation suivante.
    active_item: Option<usize>,
    caption: String,
    unsaved_changes: bool,
    sink: Arc<dyn RenderSink>,
}

impl Playlist {
    /// Playlist vide.
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        Self {
            items: Vec::new(),
            active_item: None,
            caption: String::new(),
            unsaved_changes: false,
            sink,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: String) {
        self.caption = caption;
        self.unsaved_changes = true;
    }

    pub fn unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// À appeler après une sauvegarde réussie par le collaborateur de
    /// persistance.
    pub fn mark_saved(&mut self) {
        self.unsaved_changes = false;
    }

    pub fn active_item(&self) -> Option<usize> {
        self.active_item
    }

    pub fn item(&self, index: usize) -> Option<&PlaylistItem> {
        self.items.get(index)
    }

    fn validate_item_number(&self, index: i64) -> Result<usize> {
        rgcutils::normalize_index(index, self.items.len()).ok_or(PlaylistError::InvalidItemIndex {
            index,
            len: self.items.len(),
        })
    }

    /// Insère un item construit depuis `props`.
    ///
    /// `index` absent = fin de liste ; une insertion avant l'item actif
    /// décale le pointeur pour qu'il continue de désigner le même item.
    pub fn add_item(
        &mut self,
        props: ItemProps,
        index: Option<i64>,
        set_active: bool,
        ctx: &ItemContext<'_>,
    ) -> Result<usize> {
        let len = self.items.len();
        let idx = match index {
            None => len,
            Some(i) => {
                let resolved = if i < 0 { i + len as i64 } else { i };
                // `len` est une position d'insertion valide (fin de liste).
                if !(0..=len as i64).contains(&resolved) {
                    return Err(PlaylistError::InvalidItemIndex { index: i, len });
                }
                resolved as usize
            }
        };

        let item = PlaylistItem::from_props(props, ctx);
        self.items.insert(idx, item);
        self.unsaved_changes = true;

        if let Some(active) = self.active_item {
            if idx <= active {
                self.active_item = Some(active + 1);
            }
        }

        if set_active {
            self.set_active_item(idx as i64, 0)?;
        }

        Ok(idx)
    }

    /// Remplace les champs mutables d'un item, même type exigé.
    pub fn update_item(
        &mut self,
        position: i64,
        props: ItemProps,
        ctx: &ItemContext<'_>,
    ) -> Result<()> {
        let idx = self.validate_item_number(position)?;
        self.items[idx].update_from(props, ctx)?;
        self.unsaved_changes = true;

        // L'item actif est rafraîchi en place (pas de rechargement complet).
        if self.active_item == Some(idx) {
            match self.items[idx].create_render_payload() {
                Ok(payload) => self.sink.update(payload),
                Err(err) => {
                    warn!(item = idx, "Active item no longer renders after update: {}", err)
                }
            }
        }

        Ok(())
    }

    /// Supprime un item. Retourne `true` si le pointeur actif a changé
    /// (les appelants s'en servent pour décider d'une rediffusion d'état).
    pub fn delete_item(&mut self, position: i64) -> Result<bool> {
        let idx = self.validate_item_number(position)?;
        let was_active = self.active_item == Some(idx);

        let mut removed = self.items.remove(idx);
        let stop_commands = removed.stop();
        if was_active && !stop_commands.is_empty() {
            self.sink.send_commands(stop_commands);
        }
        self.unsaved_changes = true;

        let mut changed = false;
        if let Some(active) = self.active_item {
            if idx <= active {
                changed = true;
                if active == 0 {
                    self.active_item = None;
                    self.sink.clear();
                } else {
                    self.active_item = Some(active - 1);
                }
            }
        }

        Ok(changed)
    }

    /// Déplace un item. Retourne la permutation complète ancien→nouveau,
    /// pour que les appelants remappent leurs références externes.
    pub fn move_item(&mut self, from: i64, to: i64) -> Result<Vec<usize>> {
        let len = self.items.len();
        let from_idx = self.validate_item_number(from)?;
        let to_idx = self.validate_item_number(to)?;

        if from_idx != to_idx {
            let item = self.items.remove(from_idx);
            self.items.insert(to_idx, item);
            self.unsaved_changes = true;
        }

        let perm: Vec<usize> = (0..len)
            .map(|i| {
                if i == from_idx {
                    to_idx
                } else if from_idx < to_idx && i > from_idx && i <= to_idx {
                    i - 1
                } else if to_idx < from_idx && i >= to_idx && i < from_idx {
                    i + 1
                } else {
                    i
                }
            })
            .collect();

        if let Some(active) = self.active_item {
            self.active_item = Some(perm[active]);
        }

        Ok(perm)
    }

    /// Active un item et pousse un chargement complet vers les renderers.
    ///
    /// Un item non affichable est une sentinelle d'échec distincte d'une
    /// erreur d'index : rien n'a muté, l'appelant ne rediffuse pas.
    pub fn set_active_item(&mut self, item: i64, slide: i64) -> Result<()> {
        let idx = self.validate_item_number(item)?;
        if !self.items[idx].displayable() {
            return Err(PlaylistError::NotDisplayable { index: idx });
        }

        // Valider le slide avant toute mutation.
        let count = self.items[idx].slide_count();
        if count > 0 && rgcutils::normalize_index(slide, count).is_none() {
            return Err(PlaylistError::InvalidSlideIndex { slide, count });
        }

        if let Some(prev) = self.active_item {
            if let Some(previous) = self.items.get_mut(prev) {
                let stop_commands = previous.stop();
                if !stop_commands.is_empty() {
                    self.sink.send_commands(stop_commands);
                }
            }
        }

        self.active_item = Some(idx);
        self.items[idx].set_active_slide(slide)?;

        let payload = self.items[idx].create_render_payload()?;
        self.sink.play(payload);
        Ok(())
    }

    /// Change le slide actif de l'item courant (saut de slide, pas de
    /// rechargement). Retourne le slide résolu.
    pub fn set_active_slide(&mut self, slide: i64) -> Result<usize> {
        let idx = self.active_item.ok_or(PlaylistError::NoActiveItem)?;
        let resolved = self.items[idx].set_active_slide(slide)?;
        let payload = self.items[idx].create_render_payload()?;
        self.sink.select_slide(resolved, payload);
        Ok(resolved)
    }

    /// Avance/recule d'un item, en sautant les items non affichables, avec
    /// bouclage aux extrémités. Un tour complet sans candidat est l'erreur
    /// « rien vers quoi naviguer » : l'état est inchangé.
    pub fn navigate_item(&mut self, steps: i64, slide_hint: i64) -> Result<()> {
        let len = self.items.len() as i64;
        if len == 0 {
            return Err(PlaylistError::NoDisplayableItems);
        }

        let start = match self.active_item {
            Some(active) => active as i64,
            // Sans item actif, le premier pas atteint l'extrémité attendue.
            None => {
                if steps > 0 {
                    len - 1
                } else {
                    0
                }
            }
        };

        let mut idx = start;
        for _ in 0..len {
            idx = (idx + steps).rem_euclid(len);
            if self.active_item == Some(idx as usize) {
                // Retour au point de départ : tour complet.
                break;
            }
            if self.items[idx as usize].displayable() {
                return self.set_active_item(idx, slide_hint);
            }
        }

        Err(PlaylistError::NoDisplayableItems)
    }

    /// Avance/recule d'un slide ; un débordement devient une navigation
    /// d'item (item suivant au premier slide, précédent au dernier).
    /// Retourne `true` si l'*item* a changé.
    pub fn navigate_slide(&mut self, steps: i64) -> Result<bool> {
        let idx = self.active_item.ok_or(PlaylistError::NoActiveItem)?;

        let overflow = self.items[idx].navigate_slide(steps);
        if overflow == 0 {
            let slide = self.items[idx].active_slide().max(0) as usize;
            let payload = self.items[idx].create_render_payload()?;
            self.sink.select_slide(slide, payload);
            return Ok(false);
        }

        self.navigate_item(steps, if steps > 0 { 0 } else { -1 })?;
        Ok(true)
    }

    /// Remplace la playlist entière (chargement d'un nouveau fichier).
    ///
    /// Chaque item est arrêté, les renderers sont vidés.
    pub fn replace(&mut self, caption: String, items: Vec<ItemProps>, ctx: &ItemContext<'_>) {
        let active = self.active_item;
        for (idx, item) in self.items.iter_mut().enumerate() {
            let stop_commands = item.stop();
            if active == Some(idx) && !stop_commands.is_empty() {
                self.sink.send_commands(stop_commands);
            }
        }

        self.items = items
            .into_iter()
            .map(|props| PlaylistItem::from_props(props, ctx))
            .collect();
        self.caption = caption;
        self.active_item = None;
        self.unsaved_changes = false;
        self.sink.clear();
    }

    /// Pages rasterisées signalées par le collaborateur externe.
    ///
    /// Retourne `true` si l'affichabilité de l'item a basculé (les
    /// appelants rediffusent alors le snapshot).
    pub fn add_rasterized_pages(&mut self, position: i64, pages: usize) -> Result<bool> {
        let idx = self.validate_item_number(position)?;
        let before = self.items[idx].displayable();
        if !self.items[idx].add_rasterized_pages(pages) {
            return Err(PlaylistError::Content(format!(
                "item {} does not accept rasterized pages",
                idx
            )));
        }
        Ok(self.items[idx].displayable() != before)
    }

    /// Pointeur item/slide actif, dérivé (jamais stocké à part).
    pub fn active_item_slide(&self) -> ActiveItemSlide {
        match self.active_item {
            Some(idx) => {
                let slide = self.items[idx].active_slide();
                ActiveItemSlide {
                    item: Some(idx),
                    slide: if slide < 0 { None } else { Some(slide as usize) },
                }
            }
            None => ActiveItemSlide::default(),
        }
    }

    /// Snapshot canonique diffusé aux clients de contrôle.
    pub fn create_client_snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            caption: self.caption.clone(),
            items: self.items.iter().map(|item| item.summary()).collect(),
            active: self.active_item_slide(),
            visible: self.sink.visibility(),
            unsaved_changes: self.unsaved_changes,
        }
    }

    pub fn set_visibility(&self, visible: bool) {
        self.sink.set_visibility(visible);
    }

    pub fn visibility(&self) -> bool {
        self.sink.visibility()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::citation::CitationStyle;
    use crate::content::{PsalmData, PsalmLibrary, PsalmSlide, SongData, SongLibrary};
    use crate::item::{CommentProps, ItemType, RawCommandProps, TemplateProps};
    use crate::payload::RenderPayload;

    /// Sink enregistreur : trace les appels dans l'ordre.
    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
        visible: AtomicBool,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            let sink = Self::default();
            sink.visible.store(true, Ordering::SeqCst);
            Arc::new(sink)
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RenderSink for RecordingSink {
        fn play(&self, payload: RenderPayload) {
            self.calls.lock().unwrap().push(format!("play:{}", payload.kind()));
        }

        fn update(&self, payload: RenderPayload) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("update:{}", payload.kind()));
        }

        fn select_slide(&self, slide: usize, _payload: RenderPayload) {
            self.calls.lock().unwrap().push(format!("slide:{}", slide));
        }

        fn set_visibility(&self, visible: bool) {
            self.visible.store(visible, Ordering::SeqCst);
            self.calls.lock().unwrap().push(format!("visible:{}", visible));
        }

        fn visibility(&self) -> bool {
            self.visible.load(Ordering::SeqCst)
        }

        fn send_commands(&self, lines: Vec<String>) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("commands:{}", lines.join("|")));
        }

        fn clear(&self) {
            self.calls.lock().unwrap().push("clear".to_string());
        }
    }

    /// Bibliothèque de test : psaumes à N slides, pas de chants.
    struct StubLibrary {
        psalm_slides: usize,
    }

    impl SongLibrary for StubLibrary {
        fn load_song(&self, file: &str) -> anyhow::Result<SongData> {
            Err(anyhow::anyhow!("no song {}", file))
        }
    }

    impl PsalmLibrary for StubLibrary {
        fn load_psalm(&self, _file: &str) -> anyhow::Result<PsalmData> {
            Ok(PsalmData {
                caption: "Psalm 23".to_string(),
                slides: (0..self.psalm_slides)
                    .map(|i| PsalmSlide {
                        lines: vec![format!("Vers {}", i + 1)],
                        annotation: None,
                    })
                    .collect(),
            })
        }
    }

    struct Fixture {
        style: CitationStyle,
        library: StubLibrary,
    }

    impl Fixture {
        fn new(psalm_slides: usize) -> Self {
            Self {
                style: CitationStyle::default(),
                library: StubLibrary { psalm_slides },
            }
        }

        fn ctx(&self) -> ItemContext<'_> {
            ItemContext {
                citation_style: &self.style,
                songs: &self.library,
                psalms: &self.library,
                default_language: "de",
            }
        }
    }

    fn comment(caption: &str) -> ItemProps {
        ItemProps::Comment(CommentProps {
            caption: caption.to_string(),
            color: String::new(),
        })
    }

    fn psalm(caption: &str) -> ItemProps {
        ItemProps::Psalm(crate::item::PsalmProps {
            caption: caption.to_string(),
            color: String::new(),
            file: format!("{}.psalm", caption),
        })
    }

    fn template(caption: &str) -> ItemProps {
        ItemProps::Template(TemplateProps {
            caption: caption.to_string(),
            color: String::new(),
            template: "lower-third".to_string(),
            data: serde_json::Value::Null,
        })
    }

    fn playlist_with(fixture: &Fixture, sink: Arc<RecordingSink>, items: &[ItemProps]) -> Playlist {
        let mut playlist = Playlist::new(sink);
        for props in items {
            playlist
                .add_item(props.clone(), None, false, &fixture.ctx())
                .unwrap();
        }
        playlist
    }

    #[test]
    fn test_navigation_skips_non_displayable_items() {
        let fixture = Fixture::new(3);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(
            &fixture,
            sink,
            &[comment("c0"), psalm("p1"), comment("c2"), psalm("p3")],
        );

        playlist.set_active_item(1, 0).unwrap();
        playlist.navigate_item(1, 0).unwrap();
        assert_eq!(playlist.active_item(), Some(3));

        playlist.navigate_item(-1, 0).unwrap();
        assert_eq!(playlist.active_item(), Some(1));
    }

    #[test]
    fn test_navigation_with_no_displayable_item_is_noop() {
        let fixture = Fixture::new(3);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink.clone(), &[comment("c0"), comment("c1")]);

        let err = playlist.navigate_item(1, 0).unwrap_err();
        assert!(matches!(err, PlaylistError::NoDisplayableItems));
        assert_eq!(playlist.active_item(), None);
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_navigation_wraps_around() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist =
            playlist_with(&fixture, sink, &[psalm("p0"), comment("c1"), psalm("p2")]);

        playlist.set_active_item(2, 0).unwrap();
        playlist.navigate_item(1, 0).unwrap();
        assert_eq!(playlist.active_item(), Some(0));
    }

    #[test]
    fn test_navigation_without_active_item_enters_at_edges() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist =
            playlist_with(&fixture, sink, &[psalm("p0"), psalm("p1"), psalm("p2")]);

        playlist.navigate_item(1, 0).unwrap();
        assert_eq!(playlist.active_item(), Some(0));
    }

    #[test]
    fn test_slide_overflow_advances_item_at_first_slide() {
        let fixture = Fixture::new(3);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink, &[psalm("p0"), psalm("p1")]);

        playlist.set_active_item(0, 2).unwrap();
        let item_changed = playlist.navigate_slide(1).unwrap();

        assert!(item_changed);
        assert_eq!(playlist.active_item(), Some(1));
        assert_eq!(playlist.active_item_slide().slide, Some(0));
    }

    #[test]
    fn test_slide_overflow_backward_enters_previous_at_last_slide() {
        let fixture = Fixture::new(3);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink, &[psalm("p0"), psalm("p1")]);

        playlist.set_active_item(1, 0).unwrap();
        let item_changed = playlist.navigate_slide(-1).unwrap();

        assert!(item_changed);
        assert_eq!(playlist.active_item(), Some(0));
        assert_eq!(playlist.active_item_slide().slide, Some(2));
    }

    #[test]
    fn test_in_range_slide_navigation_stays_on_item() {
        let fixture = Fixture::new(3);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink.clone(), &[psalm("p0"), psalm("p1")]);

        playlist.set_active_item(0, 0).unwrap();
        let item_changed = playlist.navigate_slide(1).unwrap();

        assert!(!item_changed);
        assert_eq!(playlist.active_item(), Some(0));
        assert_eq!(playlist.active_item_slide().slide, Some(1));
        assert!(sink.calls().contains(&"slide:1".to_string()));
    }

    #[test]
    fn test_delete_before_active_keeps_pointer_on_same_item() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist =
            playlist_with(&fixture, sink, &[psalm("a"), psalm("b"), psalm("c")]);

        playlist.set_active_item(2, 0).unwrap();
        let changed = playlist.delete_item(0).unwrap();

        assert!(changed);
        assert_eq!(playlist.active_item(), Some(1));
        // Toujours le même item « c ».
        assert_eq!(playlist.item(1).unwrap().caption(), "c");
    }

    #[test]
    fn test_delete_after_active_leaves_pointer_alone() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist =
            playlist_with(&fixture, sink, &[psalm("a"), psalm("b"), psalm("c")]);

        playlist.set_active_item(0, 0).unwrap();
        let changed = playlist.delete_item(2).unwrap();

        assert!(!changed);
        assert_eq!(playlist.active_item(), Some(0));
    }

    #[test]
    fn test_delete_last_active_item_clears_renderers() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink.clone(), &[psalm("a")]);

        playlist.set_active_item(0, 0).unwrap();
        let changed = playlist.delete_item(0).unwrap();

        assert!(changed);
        assert_eq!(playlist.active_item(), None);
        assert!(sink.calls().contains(&"clear".to_string()));
    }

    #[test]
    fn test_move_across_active_shifts_pointer() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(
            &fixture,
            sink,
            &[psalm("a"), psalm("b"), psalm("c"), psalm("d")],
        );

        playlist.set_active_item(1, 0).unwrap();
        let perm = playlist.move_item(3, 0).unwrap();

        assert_eq!(perm, vec![1, 2, 3, 0]);
        assert_eq!(playlist.active_item(), Some(2));
        assert_eq!(playlist.item(2).unwrap().caption(), "b");
    }

    #[test]
    fn test_move_active_item_follows_to_destination() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist =
            playlist_with(&fixture, sink, &[psalm("a"), psalm("b"), psalm("c")]);

        playlist.set_active_item(0, 0).unwrap();
        playlist.move_item(0, 2).unwrap();

        assert_eq!(playlist.active_item(), Some(2));
        assert_eq!(playlist.item(2).unwrap().caption(), "a");
    }

    #[test]
    fn test_add_item_before_active_increments_pointer() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink, &[psalm("a"), psalm("b")]);

        playlist.set_active_item(1, 0).unwrap();
        playlist
            .add_item(comment("note"), Some(0), false, &fixture.ctx())
            .unwrap();

        assert_eq!(playlist.active_item(), Some(2));
        assert_eq!(playlist.item(2).unwrap().caption(), "b");
    }

    #[test]
    fn test_set_active_item_rejects_non_displayable() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink.clone(), &[comment("c"), psalm("p")]);

        playlist.set_active_item(1, 0).unwrap();
        let calls_before = sink.calls().len();

        let err = playlist.set_active_item(0, 0).unwrap_err();
        assert!(matches!(err, PlaylistError::NotDisplayable { index: 0 }));
        assert_eq!(playlist.active_item(), Some(1));
        assert_eq!(sink.calls().len(), calls_before);
    }

    #[test]
    fn test_set_active_item_stops_previous_raw_command() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let raw = ItemProps::RawCommand(RawCommandProps {
            caption: "lumière".to_string(),
            color: String::new(),
            on_play: vec!["MIXER 1 BRIGHTNESS 0.5".to_string()],
            on_stop: vec!["MIXER 1 BRIGHTNESS 1".to_string()],
        });
        let mut playlist = playlist_with(&fixture, sink.clone(), &[raw, psalm("p")]);

        playlist.set_active_item(0, 0).unwrap();
        playlist.set_active_item(1, 0).unwrap();

        let calls = sink.calls();
        assert!(calls.contains(&"commands:MIXER 1 BRIGHTNESS 1".to_string()));
        // L'arrêt précède le chargement du nouvel item.
        let stop_pos = calls
            .iter()
            .position(|c| c.starts_with("commands:MIXER 1 BRIGHTNESS 1"))
            .unwrap();
        let play_pos = calls.iter().rposition(|c| c == "play:template").unwrap();
        assert!(stop_pos < play_pos);
    }

    #[test]
    fn test_update_item_rejects_type_mismatch() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink, &[psalm("p")]);

        let err = playlist
            .update_item(0, comment("nope"), &fixture.ctx())
            .unwrap_err();

        assert!(matches!(
            err,
            PlaylistError::TypeMismatch {
                expected: ItemType::Psalm,
                got: ItemType::Comment,
            }
        ));
        assert_eq!(playlist.item(0).unwrap().item_type(), ItemType::Psalm);
    }

    #[test]
    fn test_update_active_item_pushes_template_update() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink.clone(), &[template("t")]);

        playlist.set_active_item(0, 0).unwrap();
        playlist
            .update_item(0, template("t2"), &fixture.ctx())
            .unwrap();

        let calls = sink.calls();
        assert_eq!(calls.last().unwrap(), "update:template");
        // Pas de nouveau play : mise à jour en place.
        assert_eq!(calls.iter().filter(|c| *c == "play:template").count(), 1);
    }

    #[test]
    fn test_navigate_from_only_displayable_item_reports_nothing_to_reach() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink, &[comment("c"), psalm("p")]);

        playlist.set_active_item(1, 0).unwrap();
        let err = playlist.navigate_item(1, 0).unwrap_err();

        assert!(matches!(err, PlaylistError::NoDisplayableItems));
        assert_eq!(playlist.active_item(), Some(1));
    }

    #[test]
    fn test_index_errors_reject_out_of_range_positions() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink, &[psalm("p")]);

        assert!(matches!(
            playlist.delete_item(1).unwrap_err(),
            PlaylistError::InvalidItemIndex { .. }
        ));
        assert!(matches!(
            playlist.set_active_item(-2, 0).unwrap_err(),
            PlaylistError::InvalidItemIndex { .. }
        ));
        // Index négatif valide : compte depuis la fin.
        playlist.set_active_item(-1, 0).unwrap();
        assert_eq!(playlist.active_item(), Some(0));
    }

    #[test]
    fn test_replace_stops_active_item_and_clears() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let raw = ItemProps::RawCommand(RawCommandProps {
            caption: "fond".to_string(),
            color: String::new(),
            on_play: vec!["PLAY 1-5 BG_LOOP".to_string()],
            on_stop: vec!["STOP 1-5".to_string()],
        });
        let mut playlist = playlist_with(&fixture, sink.clone(), &[raw]);

        playlist.set_active_item(0, 0).unwrap();
        playlist.replace("Gottesdienst".to_string(), vec![psalm("p")], &fixture.ctx());

        assert_eq!(playlist.active_item(), None);
        assert_eq!(playlist.caption(), "Gottesdienst");
        assert!(!playlist.unsaved_changes());
        let calls = sink.calls();
        assert!(calls.contains(&"commands:STOP 1-5".to_string()));
        assert_eq!(calls.last().unwrap(), "clear");
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let mut playlist = playlist_with(&fixture, sink, &[comment("note"), psalm("p")]);
        playlist.set_caption("Sonntag".to_string());
        playlist.set_active_item(1, 1).unwrap();

        let snapshot = playlist.create_client_snapshot();
        assert_eq!(snapshot.caption, "Sonntag");
        assert_eq!(snapshot.items.len(), 2);
        assert!(!snapshot.items[0].displayable);
        assert_eq!(snapshot.items[1].slide_count, 2);
        assert_eq!(snapshot.active.item, Some(1));
        assert_eq!(snapshot.active.slide, Some(1));
        assert!(snapshot.visible);
        assert!(snapshot.unsaved_changes);
    }

    #[test]
    fn test_pdf_pages_flip_displayability() {
        let fixture = Fixture::new(2);
        let sink = RecordingSink::new();
        let pdf = ItemProps::Pdf(crate::item::PdfProps {
            caption: "Annonces".to_string(),
            color: String::new(),
            file: "annonces.pdf".to_string(),
        });
        let mut playlist = playlist_with(&fixture, sink, &[pdf]);

        assert!(!playlist.item(0).unwrap().displayable());
        assert!(playlist.add_rasterized_pages(0, 2).unwrap());
        assert!(playlist.item(0).unwrap().displayable());
        // Les pages suivantes ne rebasculent rien.
        assert!(!playlist.add_rasterized_pages(0, 1).unwrap());

        // Un psaume ne rasterise pas.
        playlist
            .add_item(psalm("p"), None, false, &fixture.ctx())
            .unwrap();
        assert!(matches!(
            playlist.add_rasterized_pages(1, 1).unwrap_err(),
            PlaylistError::Content(_)
        ));
    }
}
