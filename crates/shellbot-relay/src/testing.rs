//! In-memory stand-ins for the chat transport and the shell's input.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shellbot_common::{ChatEvent, EventHandler, Messenger, RoomId, TransportError, UserId};
use shellbot_terminal::ShellInput;

pub(crate) const BOT: &str = "@shellbot:example.org";

/// A messenger that records deliveries and plays back scripted sessions.
///
/// Each call to `listen` hands the queued events to the handler, then
/// returns the next scripted result. With no script left it never returns.
/// Scripted delivery failures are returned by the next `deliver` calls,
/// which then record nothing.
pub(crate) struct FakeMessenger {
    user: UserId,
    rooms: Mutex<Vec<RoomId>>,
    pub delivered: Mutex<Vec<(RoomId, String, String)>>,
    pub joined: Mutex<Vec<RoomId>>,
    events: Mutex<Vec<ChatEvent>>,
    sessions: Mutex<VecDeque<Result<(), TransportError>>>,
    delivery_failures: Mutex<VecDeque<TransportError>>,
    pub listen_calls: AtomicUsize,
    pub deliver_calls: AtomicUsize,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            user: UserId::new(BOT),
            rooms: Mutex::new(Vec::new()),
            delivered: Mutex::new(Vec::new()),
            joined: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            sessions: Mutex::new(VecDeque::new()),
            delivery_failures: Mutex::new(VecDeque::new()),
            listen_calls: AtomicUsize::new(0),
            deliver_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_rooms(rooms: &[&str]) -> Self {
        let fake = Self::new();
        fake.set_rooms(rooms);
        fake
    }

    pub fn set_rooms(&self, rooms: &[&str]) {
        *self.rooms.lock().unwrap() = rooms.iter().map(|r| RoomId::new(*r)).collect();
    }

    pub fn queue_event(&self, event: ChatEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn script(&self, results: impl IntoIterator<Item = Result<(), TransportError>>) {
        self.sessions.lock().unwrap().extend(results);
    }

    pub fn fail_deliveries(&self, errors: impl IntoIterator<Item = TransportError>) {
        self.delivery_failures.lock().unwrap().extend(errors);
    }

    pub fn plain_bodies(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(_, plain, _)| plain.clone())
            .collect()
    }

    pub fn listens(&self) -> usize {
        self.listen_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    fn user_id(&self) -> &UserId {
        &self.user
    }

    fn destinations(&self) -> Vec<RoomId> {
        self.rooms.lock().unwrap().clone()
    }

    async fn deliver(
        &self,
        room: &RoomId,
        plain: &str,
        formatted: &str,
    ) -> Result<(), TransportError> {
        self.deliver_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.delivery_failures.lock().unwrap().pop_front() {
            return Err(e);
        }
        self.delivered
            .lock()
            .unwrap()
            .push((room.clone(), plain.to_string(), formatted.to_string()));
        Ok(())
    }

    async fn join(&self, room: &RoomId) -> Result<(), TransportError> {
        self.joined.lock().unwrap().push(room.clone());
        self.rooms.lock().unwrap().push(room.clone());
        Ok(())
    }

    async fn listen(&self, handler: &dyn EventHandler) -> Result<(), TransportError> {
        self.listen_calls.fetch_add(1, Ordering::SeqCst);
        let events: Vec<ChatEvent> = self.events.lock().unwrap().drain(..).collect();
        for event in events {
            handler.handle(event).await;
        }
        let next = self.sessions.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

/// Collects everything written to the shell.
#[derive(Clone, Default)]
pub(crate) struct SharedWriter(pub Arc<Mutex<Vec<u8>>>);

impl SharedWriter {
    pub fn input(&self) -> ShellInput {
        ShellInput::new(Box::new(self.clone()))
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
