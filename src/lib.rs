// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runcrew: a social running community.
//!
//! This crate provides the backend API: OAuth login with JWT sessions,
//! profiles, follows and blocks, posts, workouts and track uploads, crews,
//! events, challenges, notifications and direct messages.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{
    ConversationService, DiskStorage, NotificationService, OAuthService, StorageAdapter,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub oauth: OAuthService,
    pub storage: Arc<dyn StorageAdapter>,
    pub notifications: NotificationService,
    pub conversations: ConversationService,
}

impl AppState {
    /// Wire up services around a database and storage adapter.
    pub fn new(config: Config, db: Database, storage: Arc<dyn StorageAdapter>) -> Self {
        let notifications = NotificationService::new(db.clone());
        let conversations = ConversationService::new(db.clone(), notifications.clone());

        Self {
            config,
            db,
            oauth: OAuthService::new(),
            storage,
            notifications,
            conversations,
        }
    }

    /// State backed by the configured upload directory.
    pub fn with_disk_storage(config: Config, db: Database) -> Self {
        let storage = Arc::new(DiskStorage::new(&config.upload_dir));
        Self::new(config, db, storage)
    }
}
