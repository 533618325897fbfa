use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use rgccontrol::RenderTargetPool;

mod api;
mod broadcast;
mod library;
mod session;
mod sse;

use library::{FsPsalmLibrary, FsSongLibrary};
use session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1 : Configuration & logging ==========

    let config = rgcconfig::get_config();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.get_log_min_level().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🎛️ RegieCast starting...");

    // ========== PHASE 2 : Cibles de rendu ==========

    info!("📡 Connecting render targets...");
    let pool = Arc::new(RenderTargetPool::from_config()?);
    for name in pool.target_names() {
        info!("  - renderer `{}`", name);
    }

    // ========== PHASE 3 : Session de régie ==========

    let songs = FsSongLibrary::new(config.get_song_dir()?);
    let psalms = FsPsalmLibrary::new(config.get_psalm_dir()?);
    let session = Arc::new(Session::new(pool, Box::new(songs), Box::new(psalms)));

    // ========== PHASE 4 : Surface de contrôle HTTP ==========

    let addr = SocketAddr::from(([0, 0, 0, 0], config.get_http_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Control surface listening on {}", addr);
    info!("✅ RegieCast is ready!");

    axum::serve(listener, api::router(session)).await?;

    Ok(())
}
