//! Une cible de rendu : un canal + deux couches en double-buffer.
//!
//! Chaque cible possède sa file d'opérations (worker dédié) : les
//! opérations y sont appliquées dans l'ordre des mutations de playlist,
//! une défaillance est loguée et n'arrête jamais le worker. Un moniteur de
//! connexion rejoue l'état courant exactement une fois par cycle de
//! déconnexion.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use rgcplaylist::RenderPayload;

use crate::error::{RenderError, Result};
use crate::protocol;
use crate::transport::{Connectivity, RenderConnection};

/// Paramètres résolus d'une cible.
#[derive(Debug, Clone)]
pub struct RenderTargetSettings {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub channel: u16,
    pub layer_background: u16,
    pub layer_foreground: u16,
    pub transition_frames: u32,
}

/// Opération en file vers une cible.
#[derive(Debug, Clone)]
pub enum TargetOp {
    /// Chargement complet d'un item (double-buffer).
    Play { payload: RenderPayload },
    /// Données du gabarit rafraîchies en place.
    Update { payload: RenderPayload },
    /// Changement de slide au sein de l'item courant.
    SelectSlide { slide: usize, payload: RenderPayload },
    SetVisibility { visible: bool },
    /// Lignes brutes (items RawCommand, libérations au stop).
    RawCommands { lines: Vec<String> },
    /// Rejeu de l'état courant après reconnexion.
    Resync {
        payload: Option<RenderPayload>,
        visible: bool,
    },
    /// Plus d'item actif : vider les deux couches.
    ClearAll,
}

/// Fournit l'état à rejouer au moment d'une resynchronisation.
pub type ResyncState = Arc<dyn Fn() -> (Option<RenderPayload>, bool) + Send + Sync>;

/// Handle d'une cible : enfile des opérations, ne bloque jamais.
pub struct RenderTarget {
    name: String,
    op_tx: mpsc::UnboundedSender<TargetOp>,
}

impl RenderTarget {
    /// Démarre le worker et le moniteur de reconnexion de la cible.
    pub fn spawn(
        settings: RenderTargetSettings,
        connection: Arc<dyn RenderConnection>,
        resync_state: ResyncState,
    ) -> Self {
        let (op_tx, op_rx) = mpsc::unbounded_channel();
        let name = settings.name.clone();

        let worker = TargetWorker {
            settings,
            connection: Arc::clone(&connection),
            known_media: HashSet::new(),
        };

        {
            let name = name.clone();
            tokio::spawn(async move {
                worker_loop(name, worker, op_rx).await;
            });
        }

        {
            let state_rx = connection.connectivity();
            let op_tx = op_tx.clone();
            tokio::spawn(async move {
                reconnect_monitor(state_rx, op_tx, resync_state).await;
            });
        }

        Self { name, op_tx }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fire-and-forget : l'opération part dans la file de la cible.
    pub fn enqueue(&self, op: TargetOp) {
        if self.op_tx.send(op).is_err() {
            debug!(target = %self.name, "Target worker is gone, operation dropped");
        }
    }
}

async fn worker_loop(
    name: String,
    mut worker: TargetWorker,
    mut op_rx: mpsc::UnboundedReceiver<TargetOp>,
) {
    while let Some(op) = op_rx.recv().await {
        if let Err(err) = worker.apply(op).await {
            // Best effort : la reconnexion resynchronisera.
            warn!(target = %name, "Render operation failed: {}", err);
        }
    }
    debug!(target = %name, "Target worker stopped");
}

/// Abonnement one-shot par cycle : attendre la déconnexion, attendre le
/// retour, rejouer l'état alors courant, se réabonner.
async fn reconnect_monitor(
    mut state_rx: watch::Receiver<Connectivity>,
    op_tx: mpsc::UnboundedSender<TargetOp>,
    resync_state: ResyncState,
) {
    loop {
        while *state_rx.borrow_and_update() == Connectivity::Connected {
            if state_rx.changed().await.is_err() {
                return;
            }
        }

        while *state_rx.borrow_and_update() == Connectivity::Disconnected {
            if state_rx.changed().await.is_err() {
                return;
            }
        }

        let (payload, visible) = resync_state();
        info!("Renderer back online, replaying current state");
        if op_tx.send(TargetOp::Resync { payload, visible }).is_err() {
            return;
        }
    }
}

struct TargetWorker {
    settings: RenderTargetSettings,
    connection: Arc<dyn RenderConnection>,
    /// Inventaire des clips du renderer, rafraîchi à chaque connexion.
    known_media: HashSet<String>,
}

impl TargetWorker {
    async fn apply(&mut self, op: TargetOp) -> Result<()> {
        match op {
            TargetOp::Play { payload } => self.play(payload).await,
            TargetOp::Update { payload } => self.update(payload).await,
            TargetOp::SelectSlide { slide, payload } => self.select_slide(slide, payload).await,
            TargetOp::SetVisibility { visible } => self.set_visibility(visible).await,
            TargetOp::RawCommands { lines } => self.raw_commands(lines).await,
            TargetOp::Resync { payload, visible } => self.resync(payload, visible).await,
            TargetOp::ClearAll => self.clear_all().await,
        }
    }

    /// Chargement croisé : préparer la couche arrière, vider l'avant,
    /// échanger. Le contenu sortant n'est jamais remplacé par un trou
    /// avant que l'entrant soit prêt.
    async fn play(&mut self, payload: RenderPayload) -> Result<()> {
        let s = &self.settings;

        match payload {
            RenderPayload::Template { template, data } => {
                self.connection
                    .send(protocol::cg_add(s.channel, s.layer_background, &template, &data))
                    .await?;
            }
            RenderPayload::Media {
                clip: Some(clip), ..
            } => {
                if !self.known_media.is_empty() && !self.known_media.contains(&clip) {
                    return Err(RenderError::UnknownClip(clip));
                }
                self.connection
                    .send(protocol::play_clip(
                        s.channel,
                        s.layer_background,
                        &clip,
                        s.transition_frames,
                    ))
                    .await?;
            }
            RenderPayload::Media { url: Some(url), .. } => {
                self.connection
                    .send(protocol::play_url(s.channel, s.layer_background, &url))
                    .await?;
            }
            RenderPayload::Media { .. } => {
                return Err(RenderError::UnsupportedPayload("media"));
            }
            RenderPayload::Commands { lines } => {
                // Pas de couche à préparer : transmission telle quelle.
                return self.raw_commands(lines).await;
            }
        }

        self.connection
            .send(protocol::clear(s.channel, s.layer_foreground))
            .await?;
        self.connection
            .send(protocol::swap(s.channel, s.layer_foreground, s.layer_background))
            .await?;
        Ok(())
    }

    /// Rafraîchit les données du gabarit chargé, sans rechargement.
    async fn update(&mut self, payload: RenderPayload) -> Result<()> {
        let s = &self.settings;
        match payload {
            RenderPayload::Template { data, .. } => {
                self.connection
                    .send(protocol::cg_update(s.channel, s.layer_foreground, &data))
                    .await?;
                Ok(())
            }
            other => self.play(other).await,
        }
    }

    /// Saut de slide : `jump()` sur le gabarit déjà chargé ; un média
    /// paginé repasse par un chargement croisé (nouveau clip).
    async fn select_slide(&mut self, slide: usize, payload: RenderPayload) -> Result<()> {
        let s = &self.settings;
        match payload {
            RenderPayload::Template { .. } => {
                self.connection
                    .send(protocol::cg_invoke_jump(s.channel, s.layer_foreground, slide))
                    .await?;
                Ok(())
            }
            other => self.play(other).await,
        }
    }

    /// La couche arrière est vidée d'abord : un masquage utilise alors
    /// l'animation de sortie du gabarit, pas une coupe franche.
    async fn set_visibility(&mut self, visible: bool) -> Result<()> {
        let s = &self.settings;
        self.connection
            .send(protocol::clear(s.channel, s.layer_background))
            .await?;
        let command = if visible {
            protocol::cg_play(s.channel, s.layer_foreground)
        } else {
            protocol::cg_stop(s.channel, s.layer_foreground)
        };
        self.connection.send(command).await?;
        Ok(())
    }

    async fn raw_commands(&mut self, lines: Vec<String>) -> Result<()> {
        for line in lines {
            if let Err(err) = self.connection.send(line.clone()).await {
                warn!(command = %line, "Raw command failed: {}", err);
            }
        }
        Ok(())
    }

    async fn resync(&mut self, payload: Option<RenderPayload>, visible: bool) -> Result<()> {
        self.refresh_media_inventory().await;

        match payload {
            Some(payload) => {
                self.play(payload).await?;
                if !visible {
                    let s = &self.settings;
                    self.connection
                        .send(protocol::cg_stop(s.channel, s.layer_foreground))
                        .await?;
                }
                Ok(())
            }
            None => self.clear_all().await,
        }
    }

    async fn clear_all(&mut self) -> Result<()> {
        let s = &self.settings;
        self.connection
            .send(protocol::clear(s.channel, s.layer_foreground))
            .await?;
        self.connection
            .send(protocol::clear(s.channel, s.layer_background))
            .await?;
        Ok(())
    }

    async fn refresh_media_inventory(&mut self) {
        match self.connection.send(protocol::cls()).await {
            Ok(reply) => {
                self.known_media = protocol::parse_cls_body(&reply.data);
                debug!(clips = self.known_media.len(), "Media inventory refreshed");
            }
            Err(err) => {
                // Inventaire inconnu : ne rien filtrer plutôt que tout rejeter.
                self.known_media.clear();
                debug!("CLS failed, media inventory unknown: {}", err);
            }
        }
    }
}
