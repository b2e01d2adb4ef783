// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod challenges;
pub mod conversations;
pub mod crews;
pub mod events;
pub mod feed;
pub mod notifications;
pub mod oauth;
pub mod posts;
pub mod social;
pub mod sse;
pub mod storage;
pub mod users;
pub mod workouts;

pub use conversations::ConversationService;
pub use notifications::NotificationService;
pub use oauth::{OAuthIdentity, OAuthProvider, OAuthService};
pub use sse::{PushEvent, SseRegistry};
pub use storage::{DiskStorage, StorageAdapter, StorageKey};
