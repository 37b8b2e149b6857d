//! Outbound mail delivery.

use async_trait::async_trait;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("address error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("message build error: {0}")]
    Build(String),
}

/// A message ready for delivery: plain text with an HTML alternative.
#[derive(Debug, Clone)]
pub struct Email {
    to: Mailbox,
    subject: String,
    text_body: String,
    html_body: String,
}

impl Email {
    /// Verification code message for `to`.
    pub fn verification_code(to: Mailbox, code: u32, valid_minutes: u64) -> Self {
        let text_body = format!(
            "요청하신 인증 번호입니다.\n\n{code}\n\n\
             인증 번호는 {valid_minutes}분 동안 유효합니다.\n감사합니다.\n"
        );

        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif;">
    <h3>요청하신 인증 번호입니다.</h3>
    <h1>{code}</h1>
    <p>인증 번호는 {valid_minutes}분 동안 유효합니다.</p>
    <h3>감사합니다.</h3>
  </body>
</html>"#
        );

        Self {
            to,
            subject: "이메일 인증".to_string(),
            text_body,
            html_body,
        }
    }

    pub fn to(&self) -> &Mailbox {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    fn into_message(self, from: Mailbox) -> Result<Message, MailerError> {
        let body = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .body(self.text_body),
            )
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .body(self.html_body),
            );

        Message::builder()
            .from(from)
            .to(self.to)
            .subject(self.subject)
            .multipart(body)
            .map_err(|e| MailerError::Build(e.to_string()))
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailerError>;
}

/// SMTP delivery through lettre's async transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config.from.parse()?;

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| MailerError::Smtp(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };
        builder = builder.port(config.smtp_port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        let message = email.into_message(self.from.clone())?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Smtp(e.to_string()))?;
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        info!(to = %email.to(), subject = email.subject(), "mail delivery disabled, message logged");
        debug!(body = email.text_body(), "logged mail body");
        Ok(())
    }
}
