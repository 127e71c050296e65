//! Application state - shared across all handlers.

use std::sync::Arc;

use bulletin_core::Paginator;
use bulletin_core::ports::{GroupRepository, PostRepository, UserRepository};
use bulletin_core::services::{AuthoringService, FeedService, GroupAdminService};
use bulletin_infra::InMemoryStore;

#[cfg(feature = "postgres")]
use bulletin_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use bulletin_infra::database::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub feed: FeedService,
    pub authoring: AuthoringService,
    pub groups: GroupAdminService,
    pub login_url: String,
}

impl AppState {
    /// Build the state, preferring PostgreSQL and falling back to the in-memory store.
    pub async fn new(config: &AppConfig) -> Self {
        if let Some(state) = Self::connect_postgres(config).await {
            tracing::info!("Application state initialized (postgres)");
            return state;
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory(config.posts_per_page, config.login_url.clone())
    }

    #[cfg(feature = "postgres")]
    async fn connect_postgres(config: &AppConfig) -> Option<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return None;
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                let db = connections.main;
                Some(Self::from_repositories(
                    Arc::new(PostgresUserRepository::new(db.clone())),
                    Arc::new(PostgresGroupRepository::new(db.clone())),
                    Arc::new(PostgresPostRepository::new(db)),
                    config.posts_per_page,
                    config.login_url.clone(),
                ))
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                None
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_postgres(config: &AppConfig) -> Option<Self> {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }
        None
    }

    /// State over a single fresh [`InMemoryStore`].
    pub fn in_memory(posts_per_page: u64, login_url: String) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::from_repositories(
            store.clone(),
            store.clone(),
            store,
            posts_per_page,
            login_url,
        )
    }

    pub fn from_repositories(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        posts_per_page: u64,
        login_url: String,
    ) -> Self {
        let paginator = Paginator::new(posts_per_page);

        Self {
            feed: FeedService::new(posts.clone(), groups.clone(), users.clone(), paginator),
            authoring: AuthoringService::new(posts, groups.clone()),
            groups: GroupAdminService::new(groups),
            users,
            login_url,
        }
    }
}
