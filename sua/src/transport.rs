//! A reference SCCP-User-Adaptation transport.
//!
//! The core does not implement SCCP/SUA itself; it consumes a primitive
//! interface. This module exists only so the workspace is exercisable
//! end-to-end without a real SUA/SCTP stack on hand: it frames
//! `SccpPrimitive`s over a plain TCP byte stream (TCP stood in for SCTP -
//! association-per-connection, message framing by explicit length prefix
//! rather than SCTP's native message boundaries). Production deployments
//! plug in a real SUA-over-SCTP provider behind the same `SccpUserService`
//! trait; nothing above this module needs to change.

use crate::primitives::{ConnId, LinkId, SccpPrimitive, SccpUserService, SendError};
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use slog::{debug, info, o, warn, Logger};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex as TokioMutex;

pub const KIND_CONNECT_IND: u8 = 0;
pub const KIND_DATA_IND: u8 = 1;
pub const KIND_DISCONNECT_IND: u8 = 2;
pub const KIND_UNITDATA_IND: u8 = 3;
pub const KIND_CONNECT_RESP: u8 = 4;
pub const KIND_DATA_REQ: u8 = 5;
pub const KIND_UNITDATA_REQ: u8 = 6;

/// Event surfaced to the host: either an upward SCCP-User primitive, or
/// notice that an association died (the transport's one cancellation path -
/// the core never detects link death itself).
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Primitive(SccpPrimitive),
    LinkInvalidated(LinkId),
}

/// One frame of the wire protocol spoken over a TCP association: a kind tag
/// plus the fields needed to reconstruct whichever `SccpPrimitive` (or
/// downward request) that kind represents. Public so the bundled mock RNC
/// (`mocks` crate) can speak the same protocol as a test peer.
pub struct Frame {
    pub kind: u8,
    pub conn_id: u32,
    pub calling_ssn: u8,
    pub called_ssn: u8,
    pub payload: Vec<u8>,
}

pub async fn write_frame(
    half: &mut OwnedWriteHalf,
    kind: u8,
    conn_id: u32,
    calling_ssn: u8,
    called_ssn: u8,
    payload: &[u8],
) -> std::io::Result<()> {
    let mut body = Vec::with_capacity(7 + payload.len());
    body.push(kind);
    body.extend_from_slice(&conn_id.to_be_bytes());
    body.push(calling_ssn);
    body.push(called_ssn);
    body.extend_from_slice(payload);
    half.write_u32(body.len() as u32).await?;
    half.write_all(&body).await?;
    half.flush().await
}

type WriteHalves = Arc<TokioMutex<HashMap<LinkId, OwnedWriteHalf>>>;

/// Listener + `SccpUserService` implementation bridging a dedicated tokio
/// runtime (SCTP/TCP IO) to the async-std-driven core above it.
pub struct SctpSuaService {
    write_halves: WriteHalves,
    runtime: tokio::runtime::Handle,
    bound_addr: SocketAddr,
    _keep_alive: Arc<tokio::runtime::Runtime>,
}

impl SctpSuaService {
    /// Bind `addr` and start accepting associations. Returns the service
    /// handle (for downward sends) and a receiver of upward events. Binding
    /// happens synchronously so `addr`'s port 0 (OS-assigned) can be read
    /// back via `bound_addr` right after this returns - tests rely on this.
    pub fn listen(addr: SocketAddr, logger: Logger) -> anyhow::Result<(Self, Receiver<TransportEvent>)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        let write_halves: WriteHalves = Arc::new(TokioMutex::new(HashMap::new()));
        let (tx, rx) = async_channel::unbounded();

        let std_listener = std::net::TcpListener::bind(addr)?;
        std_listener.set_nonblocking(true)?;
        let bound_addr = std_listener.local_addr()?;

        let accept_write_halves = write_halves.clone();
        let accept_logger = logger.clone();
        handle.spawn(async move {
            let listener = match TcpListener::from_std(std_listener) {
                Ok(l) => l,
                Err(e) => {
                    warn!(accept_logger, "failed to adopt SUA listener on {addr}: {e}");
                    return;
                }
            };
            info!(accept_logger, "SUA listener bound on {bound_addr}");
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let link = LinkId::new();
                        info!(accept_logger, "accepted association"; "peer" => %peer, "link" => ?link);
                        spawn_association_reader(
                            stream,
                            link,
                            accept_write_halves.clone(),
                            tx.clone(),
                            accept_logger.new(o!("link" => format!("{link:?}"))),
                        );
                    }
                    Err(e) => {
                        warn!(accept_logger, "accept failed: {e}");
                    }
                }
            }
        });

        Ok((
            SctpSuaService {
                write_halves,
                runtime: handle,
                bound_addr,
                _keep_alive: Arc::new(runtime),
            },
            rx,
        ))
    }

    pub fn bound_addr(&self) -> SocketAddr {
        self.bound_addr
    }
}

fn spawn_association_reader(
    stream: TcpStream,
    link: LinkId,
    write_halves: WriteHalves,
    events: Sender<TransportEvent>,
    logger: Logger,
) {
    tokio::spawn(async move {
        let (mut read_half, write_half) = stream.into_split();
        write_halves.lock().await.insert(link, write_half);

        loop {
            match read_frame_from_half(&mut read_half).await {
                Ok(frame) => {
                    let prim = match frame.kind {
                        KIND_CONNECT_IND => Some(SccpPrimitive::NConnectIndication {
                            link,
                            conn_id: ConnId(frame.conn_id),
                            payload: frame.payload,
                        }),
                        KIND_DATA_IND => Some(SccpPrimitive::NDataIndication {
                            link,
                            conn_id: ConnId(frame.conn_id),
                            payload: frame.payload,
                        }),
                        KIND_DISCONNECT_IND => Some(SccpPrimitive::NDisconnectIndication {
                            link,
                            conn_id: ConnId(frame.conn_id),
                            payload: if frame.payload.is_empty() {
                                None
                            } else {
                                Some(frame.payload)
                            },
                        }),
                        KIND_UNITDATA_IND => {
                            Some(SccpPrimitive::NUnitDataIndication {
                                link,
                                payload: frame.payload,
                            })
                        }
                        other => {
                            debug!(logger, "dropping frame with unexpected kind {other}");
                            None
                        }
                    };
                    if let Some(prim) = prim {
                        if events.send(TransportEvent::Primitive(prim)).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    debug!(logger, "association read ended: {e}");
                    break;
                }
            }
        }

        write_halves.lock().await.remove(&link);
        let _ = events.send(TransportEvent::LinkInvalidated(link)).await;
    });
}

pub async fn read_frame_from_half(
    half: &mut tokio::net::tcp::OwnedReadHalf,
) -> std::io::Result<Frame> {
    let len = half.read_u32().await? as usize;
    let mut rest = vec![0u8; len];
    half.read_exact(&mut rest).await?;
    Ok(Frame {
        kind: rest[0],
        conn_id: u32::from_be_bytes([rest[1], rest[2], rest[3], rest[4]]),
        calling_ssn: rest[5],
        called_ssn: rest[6],
        payload: rest[7..].to_vec(),
    })
}

#[async_trait]
impl SccpUserService for SctpSuaService {
    async fn respond_connect(&self, link: LinkId, conn_id: ConnId) -> Result<(), SendError> {
        self.write(link, KIND_CONNECT_RESP, conn_id.0, 0, 0, &[])
            .await
    }

    async fn send_data(
        &self,
        link: LinkId,
        conn_id: ConnId,
        payload: Vec<u8>,
    ) -> Result<(), SendError> {
        self.write(link, KIND_DATA_REQ, conn_id.0, 0, 0, &payload)
            .await
    }

    async fn send_unitdata(
        &self,
        link: LinkId,
        payload: Vec<u8>,
        calling_ssn: u8,
        called_ssn: u8,
    ) -> Result<(), SendError> {
        self.write(link, KIND_UNITDATA_REQ, 0, calling_ssn, called_ssn, &payload)
            .await
    }
}

impl SctpSuaService {
    async fn write(
        &self,
        link: LinkId,
        kind: u8,
        conn_id: u32,
        calling_ssn: u8,
        called_ssn: u8,
        payload: &[u8],
    ) -> Result<(), SendError> {
        let write_halves = self.write_halves.clone();
        let payload = payload.to_vec();
        self.runtime
            .spawn(async move {
                let mut guard = write_halves.lock().await;
                let half = guard.get_mut(&link).ok_or(SendError::LinkDown(link))?;
                write_frame(half, kind, conn_id, calling_ssn, called_ssn, &payload)
                    .await
                    .map_err(|e| SendError::Transport(anyhow::Error::from(e)))
            })
            .await
            .map_err(|e| SendError::Transport(anyhow::anyhow!("transport task panicked: {e}")))?
    }
}
