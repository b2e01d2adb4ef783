// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod challenge;
pub mod conversation;
pub mod crew;
pub mod cursor;
pub mod event;
pub mod notification;
pub mod post;
pub mod social;
pub mod user;
pub mod workout;

pub use challenge::{Challenge, LeaderboardEntry};
pub use conversation::{Conversation, Message};
pub use crew::{BoardPost, Crew, CrewMember, CrewRole};
pub use cursor::{FeedCursor, Page, PageQuery, PageRequest};
pub use event::{Event, Registration, RegistrationStatus};
pub use notification::{Notification, NotificationKind};
pub use post::{Comment, Post};
pub use social::RelationEntry;
pub use user::{User, UserSummary};
pub use workout::{FeedItem, Workout};
