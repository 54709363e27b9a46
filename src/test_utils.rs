#[cfg(test)]
pub mod test_utils {
    use crate::config::{Settings, build_app_state};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use accounts::users::{self, NewUser};
    use axum::Router;
    use axum_test::TestServer;
    use migration::{Migrator, MigratorTrait};
    use model::entities::custom_user;
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

    pub const TEST_PASSWORD: &str = "password123";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Settings with every surface mounted and a fixed secret
    pub fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.jwt.secret = "test-secret".to_string();
        settings.media_root = std::env::temp_dir();
        settings
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state(settings: Settings) -> AppState {
        let db = setup_test_db().await;
        build_app_state(db, settings)
    }

    /// Initialize tracing for tests; the level comes from RUST_LOG, WARN by default.
    fn init_test_tracing() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    /// Create axum app for testing
    pub fn setup_test_app(state: AppState) -> Router {
        init_test_tracing();
        create_router(state)
    }

    /// Test server over a fresh database, returning the state for seeding
    pub async fn setup_test_server_with(settings: Settings) -> (TestServer, AppState) {
        let state = setup_test_app_state(settings).await;
        let server = TestServer::new(setup_test_app(state.clone()))
            .expect("Failed to start test server");
        (server, state)
    }

    pub async fn setup_test_server() -> (TestServer, AppState) {
        setup_test_server_with(test_settings()).await
    }

    /// Insert an account and issue a token for it
    pub async fn create_user_with_token(
        state: &AppState,
        email: &str,
        staff: bool,
    ) -> (custom_user::Model, String) {
        let new_user = NewUser {
            username: email.split('@').next().map(str::to_string),
            ..NewUser::new(email, Some(TEST_PASSWORD))
        };
        let user = if staff {
            users::create_superuser(&state.db, new_user).await
        } else {
            users::create_user(&state.db, new_user).await
        }
        .expect("Failed to create test user");
        let token = state.jwt.issue(&user).expect("Failed to issue token");
        (user, token)
    }

    /// `Authorization` header value with the default prefix
    pub fn jwt_header(token: &str) -> String {
        format!("JWT {}", token)
    }
}
