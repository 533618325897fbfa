//! Pool de cibles de rendu : construit une fois au démarrage, passé en
//! handle à la playlist.
//!
//! Le pool possède l'état global de rendu (payload courant + visibilité)
//! et chaque opération logique part vers toutes les cibles, indépendamment
//! et en parallèle : la file d'une cible lente ou morte ne retient jamais
//! les autres.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{info, warn};

use rgcconfig::RendererSettings;
use rgcplaylist::{RenderPayload, RenderSink};

use crate::connection::TcpRenderConnection;
use crate::target::{RenderTarget, RenderTargetSettings, TargetOp};
use crate::transport::{RenderConnection, StubConnection};

const REPLY_TIMEOUT: Duration = Duration::from_secs(3);

/// État répliqué vers chaque cible (et rejoué à la reconnexion).
struct PoolState {
    current: Option<RenderPayload>,
    visible: bool,
}

pub struct RenderTargetPool {
    targets: Vec<RenderTarget>,
    state: Arc<RwLock<PoolState>>,
}

impl RenderTargetPool {
    /// Construit le pool depuis la liste des renderers configurés.
    ///
    /// Une entrée inutilisable (hôte vide, port nul) est dégradée en stub
    /// définitivement déconnecté plutôt que de faire échouer le pool.
    pub fn new(settings_list: Vec<RendererSettings>, transition_frames: u32) -> Self {
        let state = Arc::new(RwLock::new(PoolState {
            current: None,
            visible: true,
        }));

        let targets = settings_list
            .into_iter()
            .map(|entry| {
                let settings = RenderTargetSettings {
                    name: entry.name,
                    host: entry.host,
                    port: entry.port,
                    channel: entry.channel,
                    layer_background: entry.layer_background,
                    layer_foreground: entry.layer_foreground,
                    transition_frames,
                };

                let connection: Arc<dyn RenderConnection> =
                    if settings.host.is_empty() || settings.port == 0 {
                        warn!(
                            target = %settings.name,
                            "Unusable renderer settings, target degraded to disconnected stub"
                        );
                        Arc::new(StubConnection::new())
                    } else {
                        Arc::new(TcpRenderConnection::spawn(
                            &settings.name,
                            &settings.host,
                            settings.port,
                            REPLY_TIMEOUT,
                        ))
                    };

                let state_for_resync = Arc::clone(&state);
                RenderTarget::spawn(
                    settings,
                    connection,
                    Arc::new(move || {
                        let state = state_for_resync.read().unwrap();
                        (state.current.clone(), state.visible)
                    }),
                )
            })
            .collect::<Vec<_>>();

        info!(targets = targets.len(), "Render target pool ready");
        Self { targets, state }
    }

    /// Construit le pool depuis la configuration globale.
    pub fn from_config() -> anyhow::Result<Self> {
        let config = rgcconfig::get_config();
        let targets = config.get_renderer_targets()?;
        Ok(Self::new(targets, config.get_transition_frames()))
    }

    pub fn target_names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name().to_string()).collect()
    }

    fn broadcast<F>(&self, make_op: F)
    where
        F: Fn() -> TargetOp,
    {
        for target in &self.targets {
            target.enqueue(make_op());
        }
    }
}

impl RenderSink for RenderTargetPool {
    fn play(&self, payload: RenderPayload) {
        self.state.write().unwrap().current = Some(payload.clone());
        self.broadcast(|| TargetOp::Play {
            payload: payload.clone(),
        });
    }

    fn update(&self, payload: RenderPayload) {
        self.state.write().unwrap().current = Some(payload.clone());
        self.broadcast(|| TargetOp::Update {
            payload: payload.clone(),
        });
    }

    fn select_slide(&self, slide: usize, payload: RenderPayload) {
        self.state.write().unwrap().current = Some(payload.clone());
        self.broadcast(|| TargetOp::SelectSlide {
            slide,
            payload: payload.clone(),
        });
    }

    fn set_visibility(&self, visible: bool) {
        self.state.write().unwrap().visible = visible;
        self.broadcast(|| TargetOp::SetVisibility { visible });
    }

    fn visibility(&self) -> bool {
        self.state.read().unwrap().visible
    }

    fn send_commands(&self, lines: Vec<String>) {
        self.broadcast(|| TargetOp::RawCommands {
            lines: lines.clone(),
        });
    }

    fn clear(&self) {
        self.state.write().unwrap().current = None;
        self.broadcast(|| TargetOp::ClearAll);
    }
}
