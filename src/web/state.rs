//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{IdCipher, TokenIssuer, VerificationStore};
use crate::mail::{MailService, Mailer};
use crate::proxy::{AnalyticsClient, AnalyticsService};
use crate::{Config, Database, Result};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenIssuer,
    /// Encrypts user and store ids exposed to clients.
    pub ids: IdCipher,
    pub mail: MailService,
    pub analytics: AnalyticsService,
}

impl AppState {
    /// Build the state from configuration, an open database and a mail transport.
    pub fn new(config: &Config, db: Database, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let ids = IdCipher::new(&config.id_cipher.secret, &config.id_cipher.salt);
        let codes = VerificationStore::new(Duration::from_secs(config.verification.code_ttl_secs));
        let mail = MailService::new(mailer, codes, config.verification.code_ttl_secs);
        let analytics = AnalyticsService::new(AnalyticsClient::new(&config.analytics)?, ids.clone());

        Ok(Self {
            db,
            tokens: TokenIssuer::from_config(&config.jwt),
            ids,
            mail,
            analytics,
        })
    }

    /// Pending mail verification codes.
    pub fn codes(&self) -> &VerificationStore {
        self.mail.codes()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("pending_codes", &self.codes().len())
            .finish_non_exhaustive()
    }
}
