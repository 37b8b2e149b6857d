//! Verification mail service.

use std::sync::Arc;

use lettre::message::Mailbox;
use tracing::{error, info, warn};

use super::mailer::{Email, Mailer};
use crate::auth::VerificationStore;
use crate::{ErrorMessage, Result, StoreLensError};

/// Issues verification codes and sends them by mail.
#[derive(Clone)]
pub struct MailService {
    mailer: Arc<dyn Mailer>,
    codes: VerificationStore,
    valid_minutes: u64,
}

impl MailService {
    pub fn new(mailer: Arc<dyn Mailer>, codes: VerificationStore, code_ttl_secs: u64) -> Self {
        Self {
            mailer,
            codes,
            valid_minutes: (code_ttl_secs / 60).max(1),
        }
    }

    /// Issue a code for `mail` and deliver it in the background.
    ///
    /// Returns once the message is built. Delivery failures are only logged.
    pub fn send_code(&self, mail: &str) -> Result<()> {
        let to: Mailbox = mail.trim().parse().map_err(|e| {
            error!(error = %e, "failed to build verification mail");
            StoreLensError::Internal(ErrorMessage::ErrInternalServerMailSendFailError)
        })?;

        let code = self.codes.issue(mail);
        let email = Email::verification_code(to, code, self.valid_minutes);
        let mailer = Arc::clone(&self.mailer);

        tokio::spawn(async move {
            let to = email.to().to_string();
            match mailer.send(email).await {
                Ok(()) => info!(to = %to, "verification mail sent"),
                Err(e) => warn!(
                    to = %to,
                    error = %e,
                    code = %ErrorMessage::ErrInternalServerMailSendFailError,
                    "verification mail delivery failed"
                ),
            }
        });

        Ok(())
    }

    /// Check a code without consuming it.
    pub fn verify_code(&self, mail: &str, code: u32) -> Result<()> {
        if self.codes.check(mail, code) {
            Ok(())
        } else {
            Err(StoreLensError::BadRequest(ErrorMessage::ErrInvalidMailNumber))
        }
    }

    pub fn codes(&self) -> &VerificationStore {
        &self.codes
    }
}
