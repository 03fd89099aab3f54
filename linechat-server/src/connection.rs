/// Per-connection lifecycle: accepted, joined, active, closed
use std::sync::Arc;

use futures::TryStreamExt;
use linechat_protocol::{encode_frame, Message, MessageCodec};
use tokio::{
    io::AsyncWriteExt,
    net::{tcp::OwnedWriteHalf, TcpStream},
    sync::mpsc,
};
use tokio_util::{bytes::Bytes, codec::FramedRead};
use tracing::{debug, info, warn};

use crate::registry::{ConnectionId, PeerHandle, Registry};

/// Drives one accepted connection from its `joined` frame to the leave
/// notice. This task is the only place the id is removed from the
/// registry, so the closed transition runs exactly once.
pub(crate) async fn handle_connection(
    id: ConnectionId,
    stream: TcpStream,
    registry: Arc<Registry>,
) {
    let peer_addr = stream.peer_addr().ok();
    info!(id, ?peer_addr, "connection accepted");

    let (read_half, write_half) = stream.into_split();
    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    tokio::spawn(write_outbound(id, outbound_rx, write_half));

    registry.add(PeerHandle::new(id, outbound.clone())).await;

    // Joined: tell the new connection its id, then everyone else
    if let Some(frame) = encode_or_log(Message::joined(id)) {
        if outbound.send(frame).is_err() {
            debug!(id, "writer gone before joined frame");
        }
    }
    if let Some(frame) = encode_or_log(Message::info(format!("User {id} joined the chat"))) {
        registry.broadcast_except(id, frame).await;
    }

    // Active: relay chat frames until EOF or a read error. Malformed
    // frames never surface here; the codec drops them and keeps going.
    let mut reader = FramedRead::new(read_half, MessageCodec::default());
    loop {
        match reader.try_next().await {
            Ok(Some(Message::Msg { msg })) => {
                let relayed = Message::msg(format!("user {id}: {msg}"));
                if let Some(frame) = encode_or_log(relayed) {
                    // Everyone, the sender included; only join/leave
                    // notices exclude anyone
                    registry.broadcast_all(frame).await;
                }
            }
            Ok(Some(other)) => {
                warn!(id, frame = ?other, "ignoring frame clients may not send");
            }
            Ok(None) => break,
            Err(err) => {
                warn!(id, %err, "read failed");
                break;
            }
        }
    }

    // Closed: remove once, then tell the others
    registry.remove(id).await;
    if let Some(frame) = encode_or_log(Message::info(format!("User {id} left the chat"))) {
        registry.broadcast_except(id, frame).await;
    }
    info!(id, "connection closed");
}

/// Drains the connection's outbound queue to its socket. A write
/// failure ends only this task; the read side observes the broken
/// stream and runs the close path.
async fn write_outbound(
    id: ConnectionId,
    mut queue: mpsc::UnboundedReceiver<Bytes>,
    mut writer: OwnedWriteHalf,
) {
    while let Some(frame) = queue.recv().await {
        if let Err(err) = writer.write_all(&frame).await {
            debug!(id, %err, "write failed, dropping outbound queue");
            break;
        }
    }
}

// Serializing our own enum cannot realistically fail; if it ever does,
// the broadcast is skipped rather than the connection killed
fn encode_or_log(message: Message) -> Option<Bytes> {
    match encode_frame(message) {
        Ok(frame) => Some(frame),
        Err(err) => {
            warn!(%err, "failed to encode outbound frame");
            None
        }
    }
}
