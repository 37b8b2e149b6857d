//! Mail module for StoreLens.
//!
//! Verification code mail: message building, SMTP delivery, and the
//! service that ties codes to deliveries.

mod mailer;
mod service;

pub use mailer::{Email, LogMailer, Mailer, MailerError, SmtpMailer};
pub use service::MailService;
