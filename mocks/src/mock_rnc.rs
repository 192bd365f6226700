//! mock_rnc - enables a test script to assume the role of the RNC/HNB-GW on
//! the Iu interface, driving the `iu-cn` adaptor end-to-end without a real
//! radio network.
//!
//! Runs its own dedicated tokio runtime, exactly as `sua::SctpSuaService`
//! does, so the connection's reads and writes make progress independent of
//! whatever executor the test itself runs under (async-std, in the bundled
//! integration tests).

use anyhow::{bail, Result};
use ranap::{RanapCodec, RanapPdu, WireCodec};
use slog::{info, o, Logger};
use std::net::SocketAddr;
use std::sync::Arc;
use sua::{
    read_frame_from_half, write_frame, Frame, KIND_CONNECT_IND, KIND_CONNECT_RESP, KIND_DATA_IND,
    KIND_DATA_REQ, KIND_DISCONNECT_IND, KIND_UNITDATA_IND, KIND_UNITDATA_REQ,
};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex as TokioMutex;

const RANAP_SSN: u8 = 142;

pub struct MockRnc {
    read_half: Arc<TokioMutex<OwnedReadHalf>>,
    write_half: Arc<TokioMutex<OwnedWriteHalf>>,
    codec: WireCodec,
    logger: Logger,
    runtime: tokio::runtime::Handle,
    _keep_alive: Arc<tokio::runtime::Runtime>,
}

impl MockRnc {
    pub async fn connect(addr: SocketAddr, logger: &Logger) -> Result<MockRnc> {
        let logger = logger.new(o!("role" => "mock-rnc"));
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        let stream = handle.spawn(async move { TcpStream::connect(addr).await }).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(MockRnc {
            read_half: Arc::new(TokioMutex::new(read_half)),
            write_half: Arc::new(TokioMutex::new(write_half)),
            codec: WireCodec,
            logger,
            runtime: handle,
            _keep_alive: Arc::new(runtime),
        })
    }

    async fn write(
        &self,
        kind: u8,
        conn_id: u32,
        calling_ssn: u8,
        called_ssn: u8,
        payload: Vec<u8>,
    ) -> Result<()> {
        let write_half = self.write_half.clone();
        self.runtime
            .spawn(async move {
                let mut half = write_half.lock().await;
                write_frame(&mut half, kind, conn_id, calling_ssn, called_ssn, &payload).await
            })
            .await??;
        Ok(())
    }

    /// Open a dialogue by sending N-CONNECT.indication carrying an encoded
    /// InitialUE, as a real RNC does the moment a UE makes first contact.
    pub async fn send_initial_ue(&self, conn_id: u32, pdu_bytes: &[u8]) -> Result<()> {
        info!(self.logger, "N-CONNECT.indication(InitialUE) >>"; "conn_id" => conn_id);
        self.write(KIND_CONNECT_IND, conn_id, 0, 0, pdu_bytes.to_vec()).await
    }

    /// In-dialogue upward data (N-DATA.indication).
    pub async fn send_data(&self, conn_id: u32, pdu_bytes: &[u8]) -> Result<()> {
        self.write(KIND_DATA_IND, conn_id, 0, 0, pdu_bytes.to_vec()).await
    }

    /// Dialogue teardown (N-DISCONNECT.indication); `pdu_bytes` is `None`
    /// when the RNC tears the dialogue down without an attached RANAP PDU.
    pub async fn send_disconnect(&self, conn_id: u32, pdu_bytes: Option<&[u8]>) -> Result<()> {
        let payload = pdu_bytes.unwrap_or_default().to_vec();
        self.write(KIND_DISCONNECT_IND, conn_id, 0, 0, payload).await
    }

    /// Connection-less upward data (N-UNITDATA.indication), e.g. Reset.
    pub async fn send_unitdata(&self, pdu_bytes: &[u8]) -> Result<()> {
        self.write(KIND_UNITDATA_IND, 0, RANAP_SSN, RANAP_SSN, pdu_bytes.to_vec())
            .await
    }

    /// Wait for the next frame the CN sends downward, without decoding it -
    /// for observing N-CONNECT.response, which carries no RANAP payload.
    pub async fn receive_frame(&self) -> Result<Frame> {
        let read_half = self.read_half.clone();
        Ok(self
            .runtime
            .spawn(async move {
                let mut half = read_half.lock().await;
                read_frame_from_half(&mut half).await
            })
            .await??)
    }

    /// Wait for the next downward RANAP-bearing frame (N-DATA.request or
    /// N-UNITDATA.request) and decode it.
    pub async fn receive_ranap(&self) -> Result<RanapPdu> {
        loop {
            let frame = self.receive_frame().await?;
            match frame.kind {
                KIND_DATA_REQ | KIND_UNITDATA_REQ => return Ok(self.codec.decode(&frame.payload)?),
                KIND_CONNECT_RESP => continue,
                other => bail!("unexpected downward frame kind {other}"),
            }
        }
    }
}
