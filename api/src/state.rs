//! Shared application state handed to every handler.
//!
//! Client handles (database, session cache, push, mail, JWT keys) are built
//! once by [`AppState::connect`] in `main` and released by [`AppState::close`].

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use migration::Migrator;
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use services::{
    attendance::{AttendanceService, SessionPolicy},
    auth::OtpService,
    error::AppError,
    mailer::Mailer,
    notifications::Notifier,
    push::PushGateway,
    session_store::{MemoryStore, RedisStore, SessionStore},
};
use util::config::AppConfig;

pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub duration_minutes: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, duration_minutes: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            duration_minutes: duration_minutes as i64,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    attendance: AttendanceService,
    otp: OtpService,
    jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        store: Arc<dyn SessionStore>,
        push: Arc<dyn PushGateway>,
        mailer: Arc<dyn Mailer>,
        jwt: JwtKeys,
    ) -> Self {
        let notifier = Notifier::new(db.clone(), push);
        let attendance =
            AttendanceService::new(db.clone(), store, notifier, SessionPolicy::from_config());
        let otp = OtpService::from_config(db.clone(), mailer);

        Self {
            db,
            attendance,
            otp,
            jwt: Arc::new(jwt),
        }
    }

    /// Connects every backing service described by the global configuration.
    ///
    /// Pending migrations are applied. An empty `REDIS_URL` selects the
    /// in-memory session store.
    pub async fn connect() -> Result<Self, AppError> {
        let cfg = AppConfig::global().clone();
        if cfg.jwt_secret.trim().is_empty() {
            return Err(AppError::internal("JWT_SECRET must be set"));
        }

        let db = db::connect().await?;
        Migrator::up(&db, None).await?;

        let store: Arc<dyn SessionStore> = if cfg.redis_url.trim().is_empty() {
            tracing::warn!("REDIS_URL not set; open sessions are kept in process memory");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(RedisStore::connect(&cfg.redis_url).await?)
        };

        let push = services::push::from_config();
        let mailer = crate::services::email::from_config();

        Ok(Self::new(
            db,
            store,
            push,
            mailer,
            JwtKeys::new(&cfg.jwt_secret, cfg.jwt_duration_minutes),
        ))
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    pub fn otp(&self) -> &OtpService {
        &self.otp
    }

    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }
}
