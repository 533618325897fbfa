//! Connexion TCP vers un renderer : acteur tokio avec boucle de
//! reconnexion.
//!
//! Les commandes passent par un canal mpsc vers l'acteur ; pendant une
//! déconnexion elles échouent immédiatement (`Disconnected`) au lieu de
//! s'accumuler — la resynchronisation au retour de connexion rejouera
//! l'état courant, pas les commandes périmées.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{RenderError, Result};
use crate::protocol::{self, Reply, ReplyBody};
use crate::transport::{Connectivity, RenderConnection};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const RECONNECT_DELAY: Duration = Duration::from_secs(2);
const COMMAND_QUEUE: usize = 64;

struct Request {
    command: String,
    reply_tx: oneshot::Sender<Result<Reply>>,
}

/// Connexion AMCP réelle (une par cible de rendu).
pub struct TcpRenderConnection {
    cmd_tx: mpsc::Sender<Request>,
    state_rx: watch::Receiver<Connectivity>,
}

impl TcpRenderConnection {
    /// Démarre l'acteur de connexion ; retourne immédiatement, la
    /// connexion s'établit (et se rétablit) en arrière-plan.
    pub fn spawn(name: &str, host: &str, port: u16, reply_timeout: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
        let (state_tx, state_rx) = watch::channel(Connectivity::Disconnected);

        let name = name.to_string();
        let addr = if host.contains(':') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };

        tokio::spawn(async move {
            connection_loop(name, addr, reply_timeout, cmd_rx, state_tx).await;
        });

        Self { cmd_tx, state_rx }
    }
}

#[async_trait]
impl RenderConnection for TcpRenderConnection {
    async fn send(&self, command: String) -> Result<Reply> {
        let sent = command.clone();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(Request { command, reply_tx })
            .await
            .map_err(|_| RenderError::Disconnected)?;

        let reply = reply_rx.await.map_err(|_| RenderError::Disconnected)??;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(RenderError::Protocol {
                code: reply.code,
                command: sent,
            })
        }
    }

    fn connectivity(&self) -> watch::Receiver<Connectivity> {
        self.state_rx.clone()
    }
}

async fn connection_loop(
    name: String,
    addr: String,
    reply_timeout: Duration,
    mut cmd_rx: mpsc::Receiver<Request>,
    state_tx: watch::Sender<Connectivity>,
) {
    loop {
        match timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => {
                info!(renderer = %name, addr = %addr, "Renderer connected");
                let _ = stream.set_nodelay(true);
                state_tx.send_replace(Connectivity::Connected);

                let closed = serve(&name, stream, reply_timeout, &mut cmd_rx).await;
                state_tx.send_replace(Connectivity::Disconnected);
                if closed {
                    return;
                }
                warn!(renderer = %name, "Renderer connection lost, will reconnect");
            }
            Ok(Err(err)) => {
                debug!(renderer = %name, addr = %addr, "Connect failed: {}", err);
            }
            Err(_) => {
                debug!(renderer = %name, addr = %addr, "Connect timed out");
            }
        }

        // Fenêtre de backoff : rejeter les commandes au lieu de les retenir.
        let deadline = tokio::time::sleep(RECONNECT_DELAY);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                request = cmd_rx.recv() => match request {
                    Some(request) => {
                        let _ = request.reply_tx.send(Err(RenderError::Disconnected));
                    }
                    None => return,
                },
            }
        }
    }
}

/// Sert les commandes sur une connexion établie.
///
/// Retourne `true` si le canal de commandes est fermé (arrêt définitif),
/// `false` sur erreur de connexion (l'appelant retentera).
async fn serve(
    name: &str,
    stream: TcpStream,
    reply_timeout: Duration,
    cmd_rx: &mut mpsc::Receiver<Request>,
) -> bool {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    while let Some(request) = cmd_rx.recv().await {
        match timeout(
            reply_timeout,
            exchange(&mut write_half, &mut reader, &request.command),
        )
        .await
        {
            Ok(Ok(reply)) => {
                let _ = request.reply_tx.send(Ok(reply));
            }
            Ok(Err(err)) => {
                debug!(renderer = %name, command = %request.command, "I/O error: {}", err);
                let _ = request.reply_tx.send(Err(err));
                return false;
            }
            Err(_) => {
                // État du flux inconnu après un timeout : on repart sur une
                // connexion neuve.
                let _ = request.reply_tx.send(Err(RenderError::Timeout(reply_timeout)));
                return false;
            }
        }
    }

    true
}

async fn exchange(
    write_half: &mut OwnedWriteHalf,
    reader: &mut BufReader<OwnedReadHalf>,
    command: &str,
) -> Result<Reply> {
    write_half.write_all(command.as_bytes()).await?;
    write_half.write_all(b"\r\n").await?;
    write_half.flush().await?;

    let header = read_line(reader).await?;
    let code = protocol::parse_reply_header(&header)?;

    let mut data = Vec::new();
    match protocol::reply_body(code) {
        ReplyBody::None => {}
        ReplyBody::SingleLine => {
            data.push(read_line(reader).await?);
        }
        ReplyBody::UntilEmptyLine => loop {
            let line = read_line(reader).await?;
            if line.is_empty() {
                break;
            }
            data.push(line);
        },
    }

    Ok(Reply { code, data })
}

async fn read_line(reader: &mut BufReader<OwnedReadHalf>) -> Result<String> {
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Err(RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "renderer closed the connection",
        )));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}
