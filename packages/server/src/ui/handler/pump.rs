//! The two per-connection pumps.
//!
//! The inbound pump reads frames from the peer and hands them to the room.
//! The outbound pump drains the session's queue onto the wire and keeps the
//! connection alive with pings. Both are generic over the transport halves so
//! they can be driven without a socket.

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::{body::Bytes, extract::ws::Message};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};

use crate::{
    domain::IncomingMessage,
    infrastructure::{
        dto::websocket::ChatMessage as ChatMessageDto,
        hub::{Inbox, RoomHandle, Session},
    },
    usecase::SendMessageUseCase,
};

/// Why a pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The peer sent a close frame or the stream ended.
    PeerClosed,
    /// Nothing arrived within the read-liveness window.
    IdleTimeout,
    /// A frame was not a valid chat message.
    Malformed(String),
    ReadFailed(String),
    /// The room stopped while the session was still reading.
    RoomClosed,
    /// The session's queue was closed: unregistered, evicted or shut down.
    QueueClosed,
    WriteFailed(String),
}

/// Read frames until the peer goes away, misbehaves or falls silent.
///
/// Any frame, pongs included, resets the liveness window.
pub async fn inbound_pump<S, E>(
    mut stream: S,
    room: RoomHandle,
    session: Session,
    send_message: Arc<SendMessageUseCase>,
    pong_wait: Duration,
) -> PumpExit
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let frame = match timeout(pong_wait, stream.next()).await {
            Err(_) => return PumpExit::IdleTimeout,
            Ok(None) => return PumpExit::PeerClosed,
            Ok(Some(Err(e))) => return PumpExit::ReadFailed(e.to_string()),
            Ok(Some(Ok(frame))) => frame,
        };

        let parsed = match frame {
            Message::Text(text) => serde_json::from_str::<ChatMessageDto>(text.as_str()),
            Message::Binary(bytes) => serde_json::from_slice::<ChatMessageDto>(&bytes),
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Close(_) => return PumpExit::PeerClosed,
        };

        let incoming = match parsed {
            Ok(dto) => IncomingMessage::from(dto),
            Err(e) => return PumpExit::Malformed(e.to_string()),
        };

        if send_message.execute(&room, &session, incoming).is_err() {
            return PumpExit::RoomClosed;
        }
    }
}

/// Write queued messages and keepalive pings until the queue closes or a
/// write fails. A close frame is sent when the queue closes.
pub async fn outbound_pump<W>(
    mut sink: W,
    mut inbox: Inbox,
    ping_interval: Duration,
    write_wait: Duration,
) -> PumpExit
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let mut keepalive = interval_at(Instant::now() + ping_interval, ping_interval);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            message = inbox.recv() => {
                let Some(message) = message else {
                    // Best effort; the peer may already be gone.
                    let _ = write(&mut sink, Message::Close(None), write_wait).await;
                    break PumpExit::QueueClosed;
                };
                let json = match serde_json::to_string(&ChatMessageDto::from(message.as_ref())) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to encode outbound message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write(&mut sink, Message::Text(json.into()), write_wait).await {
                    break PumpExit::WriteFailed(e);
                }
            }
            _ = keepalive.tick() => {
                if let Err(e) = write(&mut sink, Message::Ping(Bytes::new()), write_wait).await {
                    break PumpExit::WriteFailed(e);
                }
            }
        }
    };

    let _ = timeout(write_wait, sink.close()).await;
    exit
}

async fn write<W>(sink: &mut W, frame: Message, write_wait: Duration) -> Result<(), String>
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    match timeout(write_wait, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("write timed out after {:?}", write_wait)),
    }
}
