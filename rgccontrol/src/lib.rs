//! # rgccontrol - Synchronisation des renderers RegieCast
//!
//! Maintient N moteurs de rendu distants (protocole AMCP sur TCP) alignés
//! sur l'état de la playlist :
//! - connexion TCP par cible avec boucle de reconnexion,
//! - double-buffer de couches (chargements croisés sans trou visible),
//! - file d'opérations ordonnée par cible, défaillances isolées et loguées,
//! - resynchronisation one-shot à chaque retour de connexion.

pub mod connection;
mod error;
pub mod pool;
pub mod protocol;
pub mod target;
pub mod transport;

pub use connection::TcpRenderConnection;
pub use error::{RenderError, Result};
pub use pool::RenderTargetPool;
pub use protocol::Reply;
pub use target::{RenderTarget, RenderTargetSettings, TargetOp};
pub use transport::{Connectivity, RenderConnection, StubConnection};
