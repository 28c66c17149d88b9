//! Per-board broadcast domain.
//!
//! Every membership change and every fan-out is processed by one event loop,
//! strictly in arrival order. Membership is never touched from anywhere else,
//! so joins, leaves and broadcasts cannot race.

use std::{
    collections::{HashMap, VecDeque},
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use boardchat_shared::time::get_timestamp_millis;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, Sleep},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::RoomConfig,
    domain::{BoardId, ChatMessage, Identity, MessageKind, SessionId, Timestamp},
};

use super::{outbox::PushError, session::Session};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room for board '{0}' is closed")]
    Closed(BoardId),
}

/// Snapshot of one member, for introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub session_id: SessionId,
    pub identity: Identity,
    pub joined_at: Timestamp,
}

#[derive(Debug)]
pub(crate) enum RoomEvent {
    Register(Session),
    Unregister(SessionId),
    Broadcast(Arc<ChatMessage>),
    Members(oneshot::Sender<Vec<MemberInfo>>),
}

/// Sent by an idle room to the hub. The hub answers `true` once the room may
/// stop.
#[derive(Debug)]
pub(crate) struct RetireRequest {
    pub room: RoomHandle,
    pub reply: oneshot::Sender<bool>,
}

/// Cheap, cloneable entry point into a room's event loop.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    board_id: BoardId,
    events: mpsc::UnboundedSender<RoomEvent>,
    /// Registrations sent but not yet processed by the loop.
    pending_registers: Arc<AtomicUsize>,
}

impl RoomHandle {
    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// Add a session to the room. Each session must be registered once.
    pub fn register(&self, session: Session) -> Result<(), RoomError> {
        self.pending_registers.fetch_add(1, Ordering::SeqCst);
        if self.events.send(RoomEvent::Register(session)).is_err() {
            self.pending_registers.fetch_sub(1, Ordering::SeqCst);
            return Err(self.closed());
        }
        Ok(())
    }

    /// Remove a session and close its queue. No-op for non-members.
    pub fn unregister(&self, session_id: SessionId) -> Result<(), RoomError> {
        self.send(RoomEvent::Unregister(session_id))
    }

    /// Fan a message out to every current member.
    pub fn broadcast(&self, message: Arc<ChatMessage>) -> Result<(), RoomError> {
        self.send(RoomEvent::Broadcast(message))
    }

    /// Membership as seen by the loop once every earlier event is processed.
    pub async fn members(&self) -> Result<Vec<MemberInfo>, RoomError> {
        let (reply, snapshot) = oneshot::channel();
        self.send(RoomEvent::Members(reply))?;
        snapshot.await.map_err(|_| self.closed())
    }

    /// Whether both handles point at the same room instance.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.events.same_channel(&other.events)
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    pub(crate) fn pending_registers(&self) -> usize {
        self.pending_registers.load(Ordering::SeqCst)
    }

    fn send(&self, event: RoomEvent) -> Result<(), RoomError> {
        self.events.send(event).map_err(|_| self.closed())
    }

    fn closed(&self) -> RoomError {
        RoomError::Closed(self.board_id.clone())
    }
}

pub(crate) struct Room {
    handle: RoomHandle,
    members: HashMap<SessionId, Session>,
    events: mpsc::UnboundedReceiver<RoomEvent>,
    retire: mpsc::UnboundedSender<RetireRequest>,
    config: RoomConfig,
    cancel: CancellationToken,
}

impl Room {
    /// Start the event loop for `board_id` and return its handle.
    pub(crate) fn spawn(
        board_id: BoardId,
        config: RoomConfig,
        retire: mpsc::UnboundedSender<RetireRequest>,
        cancel: CancellationToken,
    ) -> RoomHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = RoomHandle {
            board_id,
            events: tx,
            pending_registers: Arc::new(AtomicUsize::new(0)),
        };
        let room = Self {
            handle: handle.clone(),
            members: HashMap::new(),
            events: rx,
            retire,
            config,
            cancel,
        };
        tokio::spawn(room.run());
        handle
    }

    async fn run(mut self) {
        tracing::info!("Room '{}' opened", self.handle.board_id);

        // Counts down only while the room is empty; restarted on membership
        // changes, not on every event.
        let idle = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(idle);
        let mut idle_armed = self.arm_idle(idle.as_mut());

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => {
                        let before = self.members.len();
                        self.handle(event);
                        if self.members.len() != before {
                            idle_armed = self.arm_idle(idle.as_mut());
                        }
                    }
                    None => break,
                },
                () = &mut idle, if idle_armed => {
                    if self.try_retire().await {
                        break;
                    }
                    idle_armed = self.arm_idle(idle.as_mut());
                }
            }
        }

        self.close();
    }

    /// Restart the idle countdown if the room is empty. Returns whether it runs.
    fn arm_idle(&self, idle: Pin<&mut Sleep>) -> bool {
        match self.config.idle_timeout.filter(|_| self.members.is_empty()) {
            Some(timeout) => {
                idle.reset(Instant::now() + timeout);
                true
            }
            None => false,
        }
    }

    fn handle(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::Register(session) => {
                self.handle.pending_registers.fetch_sub(1, Ordering::SeqCst);
                if self.config.presence_notices {
                    self.fan_out(presence_notice(MessageKind::Join, &session));
                }
                tracing::info!(
                    "Session {} ({}) joined room '{}' ({} members)",
                    session.id(),
                    session.identity().user_id,
                    self.handle.board_id,
                    self.members.len() + 1
                );
                self.members.insert(session.id(), session);
            }
            RoomEvent::Unregister(session_id) => {
                if let Some(session) = self.members.remove(&session_id) {
                    session.outbox().close();
                    tracing::info!(
                        "Session {} ({}) left room '{}' ({} members)",
                        session_id,
                        session.identity().user_id,
                        self.handle.board_id,
                        self.members.len()
                    );
                    if self.config.presence_notices {
                        self.fan_out(presence_notice(MessageKind::Leave, &session));
                    }
                }
            }
            RoomEvent::Broadcast(message) => self.fan_out(message),
            RoomEvent::Members(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Deliver to every member without waiting. A member whose queue is full
    /// or closed is evicted on the spot.
    fn fan_out(&mut self, message: Arc<ChatMessage>) {
        let mut queue = VecDeque::from([message]);

        while let Some(message) = queue.pop_front() {
            let evicted: Vec<SessionId> = self
                .members
                .iter()
                .filter_map(|(id, session)| match session.outbox().try_push(message.clone()) {
                    Ok(()) => None,
                    Err(PushError::Full) => {
                        tracing::warn!(
                            "Session {} in room '{}' is too slow, evicting",
                            id,
                            self.handle.board_id
                        );
                        Some(*id)
                    }
                    Err(PushError::Closed) => Some(*id),
                })
                .collect();

            for id in evicted {
                if let Some(session) = self.members.remove(&id) {
                    session.outbox().close();
                    if self.config.presence_notices {
                        queue.push_back(presence_notice(MessageKind::Leave, &session));
                    }
                }
            }
        }

        tracing::debug!(
            "Fanned out message in room '{}' to {} members",
            self.handle.board_id,
            self.members.len()
        );
    }

    fn snapshot(&self) -> Vec<MemberInfo> {
        let mut members: Vec<MemberInfo> = self
            .members
            .values()
            .map(|session| MemberInfo {
                session_id: session.id(),
                identity: session.identity().clone(),
                joined_at: session.joined_at(),
            })
            .collect();
        members.sort_by_key(|m| (m.joined_at, m.identity.user_id.clone()));
        members
    }

    /// Ask the hub to drop this room from its directory.
    async fn try_retire(&mut self) -> bool {
        let (reply, answer) = oneshot::channel();
        let request = RetireRequest {
            room: self.handle.clone(),
            reply,
        };
        if self.retire.send(request).is_err() {
            return false;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            answer = answer => answer.unwrap_or(false),
        }
    }

    fn close(mut self) {
        for (_, session) in self.members.drain() {
            session.outbox().close();
        }
        self.events.close();
        while let Ok(event) = self.events.try_recv() {
            if let RoomEvent::Register(session) = event {
                session.outbox().close();
            }
        }
        tracing::info!("Room '{}' closed", self.handle.board_id);
    }
}

fn presence_notice(kind: MessageKind, session: &Session) -> Arc<ChatMessage> {
    let verb = match kind {
        MessageKind::Join => "joined",
        _ => "left",
    };
    let identity = session.identity();
    Arc::new(ChatMessage::stamped(
        kind,
        format!("{} {} the chat", identity.display_name(), verb),
        session.board_id().clone(),
        identity,
        Timestamp::new(get_timestamp_millis()),
    ))
}
