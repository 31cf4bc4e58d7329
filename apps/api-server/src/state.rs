//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::pagination::Paginator;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    DbConn, PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub paginator: Paginator,
    pub login_url: String,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match blogicum_infra::database::connect(db_config).await {
                    Ok(conn) => {
                        if config.run_migrations {
                            use migration::MigratorTrait;

                            if let Err(e) = migration::Migrator::up(&conn, None).await {
                                tracing::error!("Failed to apply migrations: {}", e);
                            }
                        }
                        tracing::info!("Application state initialized (postgres)");
                        return Self::postgres(conn, tokens, passwords, config);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory store");

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory(InMemoryStore::new(), tokens, passwords, config)
    }

    pub fn in_memory(
        store: InMemoryStore,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users: Arc::new(store.users()),
            categories: Arc::new(store.categories()),
            locations: Arc::new(store.locations()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            tokens,
            passwords,
            paginator: Paginator::new(config.posts_per_page),
            login_url: config.login_url.clone(),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(
        conn: DbConn,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
            tokens,
            passwords,
            paginator: Paginator::new(config.posts_per_page),
            login_url: config.login_url.clone(),
        }
    }
}
