// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-sent event connection registry.
//!
//! Maps a user id to that user's open SSE connections. Publishing delivers
//! to every connection of the user; nothing is buffered for users who are
//! not connected. A connection unregisters itself when its stream is
//! dropped, which happens when the client disconnects.
//!
//! Each connection has a bounded queue. A client that stops reading and
//! lets its queue fill is dropped; it reconciles with a normal fetch when
//! it reconnects.

use axum::response::sse::Event;
use dashmap::DashMap;
use futures_util::stream::{self, Stream};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// One event pushed to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    /// SSE `event:` field
    pub name: &'static str,
    /// JSON body sent as the `data:` field
    pub data: serde_json::Value,
}

impl PushEvent {
    pub fn new(name: &'static str, data: serde_json::Value) -> Self {
        Self { name, data }
    }

    fn into_sse(self) -> Event {
        Event::default().event(self.name).data(self.data.to_string())
    }
}

/// Events queued per connection before it counts as stalled.
pub const CONNECTION_BUFFER: usize = 64;

type Sender = mpsc::Sender<PushEvent>;

/// Concurrent registry of live connections, keyed by user id.
#[derive(Default)]
pub struct SseRegistry {
    connections: DashMap<i64, HashMap<u64, Sender>>,
    next_id: AtomicU64,
}

impl SseRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new connection for `user_id`.
    pub fn connect(self: &Arc<Self>, user_id: i64) -> Subscription {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        let conn_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.connections
            .entry(user_id)
            .or_default()
            .insert(conn_id, tx);

        tracing::debug!(user_id, conn_id, "SSE client connected");

        Subscription {
            receiver: rx,
            guard: ConnectionGuard {
                registry: Arc::clone(self),
                user_id,
                conn_id,
            },
        }
    }

    fn disconnect(&self, user_id: i64, conn_id: u64) {
        self.connections.remove_if_mut(&user_id, |_, conns| {
            conns.remove(&conn_id);
            conns.is_empty()
        });
        tracing::debug!(user_id, conn_id, "SSE client disconnected");
    }

    /// Deliver `event` to every connection of `user_id`.
    ///
    /// Returns the number of connections reached. Connections whose receiver
    /// is gone or whose queue is full are pruned.
    pub fn publish(&self, user_id: i64, event: PushEvent) -> usize {
        let mut delivered = 0;
        let mut now_empty = false;

        if let Some(mut conns) = self.connections.get_mut(&user_id) {
            conns.retain(|conn_id, tx| match tx.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(user_id, conn_id = *conn_id, "SSE client stalled, dropping connection");
                    false
                }
                Err(TrySendError::Closed(_)) => false,
            });
            now_empty = conns.is_empty();
        }

        if now_empty {
            self.connections.remove_if(&user_id, |_, conns| conns.is_empty());
        }

        delivered
    }

    /// Close every connection of `user_id`. Their streams end once any
    /// queued events are drained.
    pub fn disconnect_user(&self, user_id: i64) -> usize {
        let closed = self
            .connections
            .remove(&user_id)
            .map_or(0, |(_, conns)| conns.len());
        if closed > 0 {
            tracing::info!(user_id, closed, "Closed SSE connections");
        }
        closed
    }

    /// Number of open connections for `user_id`.
    pub fn connection_count(&self, user_id: i64) -> usize {
        self.connections.get(&user_id).map_or(0, |c| c.len())
    }
}

/// Removes a connection from the registry when dropped.
struct ConnectionGuard {
    registry: Arc<SseRegistry>,
    user_id: i64,
    conn_id: u64,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.disconnect(self.user_id, self.conn_id);
    }
}

/// Receiving end of one registered connection.
pub struct Subscription {
    receiver: mpsc::Receiver<PushEvent>,
    guard: ConnectionGuard,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.receiver.recv().await
    }

    /// SSE event stream; the connection stays registered while the stream lives.
    pub fn into_stream(self) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
        stream::unfold(self, |mut sub| async move {
            let event = sub.receiver.recv().await?;
            Some((Ok(event.into_sse()), sub))
        })
    }

    pub fn user_id(&self) -> i64 {
        self.guard.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_reaches_every_connection() {
        let registry = SseRegistry::new();
        let mut first = registry.connect(1);
        let mut second = registry.connect(1);
        let mut other_user = registry.connect(2);

        let event = PushEvent::new("notification", json!({ "id": 5 }));
        assert_eq!(registry.publish(1, event.clone()), 2);

        assert_eq!(first.recv().await, Some(event.clone()));
        assert_eq!(second.recv().await, Some(event));
        assert!(other_user.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_drop_unregisters() {
        let registry = SseRegistry::new();
        let first = registry.connect(1);
        let second = registry.connect(1);
        assert_eq!(registry.connection_count(1), 2);

        drop(first);
        assert_eq!(registry.connection_count(1), 1);

        drop(second);
        assert_eq!(registry.connection_count(1), 0);
        assert_eq!(registry.publish(1, PushEvent::new("message", json!({}))), 0);
    }

    #[tokio::test]
    async fn test_stalled_connection_is_dropped() {
        let registry = SseRegistry::new();
        let mut stalled = registry.connect(3);

        for i in 0..CONNECTION_BUFFER {
            let event = PushEvent::new("notification", json!({ "n": i }));
            assert_eq!(registry.publish(3, event), 1);
        }
        assert_eq!(registry.publish(3, PushEvent::new("notification", json!({}))), 0);
        assert_eq!(registry.connection_count(3), 0);

        // Queued events still drain, then the stream ends.
        for _ in 0..CONNECTION_BUFFER {
            assert!(stalled.recv().await.is_some());
        }
        assert_eq!(stalled.recv().await, None);
    }

    #[tokio::test]
    async fn test_disconnect_user_ends_streams() {
        let registry = SseRegistry::new();
        let mut first = registry.connect(4);
        let mut second = registry.connect(4);
        let mut other = registry.connect(5);

        assert_eq!(registry.disconnect_user(4), 2);
        assert_eq!(first.recv().await, None);
        assert_eq!(second.recv().await, None);
        assert_eq!(registry.connection_count(4), 0);

        registry.publish(5, PushEvent::new("message", json!({})));
        assert!(other.recv().await.is_some());

        // Dropping an already-closed subscription is harmless.
        drop(first);
        assert_eq!(registry.disconnect_user(4), 0);
    }

    #[tokio::test]
    async fn test_concurrent_connect_and_publish() {
        let registry = SseRegistry::new();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let mut sub = registry.connect(9);
                registry.publish(9, PushEvent::new("message", json!({})));
                sub.recv().await.is_some()
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(registry.connection_count(9), 0);
    }
}
