//! Email delivery for contact form submissions.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::form::ContactForm;
use crate::config::MailConfig;
use crate::error::{GatewayError, Result};

/// Trait for anything that can deliver a contact form submission.
///
/// The HTTP layer only depends on this trait, so tests can swap in a
/// recording implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a validated submission.
    async fn send(&self, form: &ContactForm) -> Result<()>;
}

/// Request body for the Resend `POST /emails` endpoint.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: String,
    html: String,
}

/// Mailer backed by the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    config: MailConfig,
    api_key: String,
}

impl ResendMailer {
    /// Create a mailer from configuration.
    pub fn new(config: MailConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| GatewayError::Config("mail.api_key is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, form: &ContactForm) -> Result<()> {
        let reply_to = form.email.trim();
        let body = SendEmailRequest {
            from: &self.config.from,
            to: [&self.config.to],
            reply_to,
            subject: format!("{}{}", self.config.subject_prefix, form.subject),
            html: render_html(form),
        };
        let idempotency_key = uuid::Uuid::new_v4();

        debug!(%idempotency_key, reply_to, "Sending contact email");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", idempotency_key.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        error!(status = %status, detail = %detail, "Email provider rejected the message");
        Err(GatewayError::Mail(format!("provider returned {}: {}", status, detail)))
    }
}

/// Render the notification email.
pub fn render_html(form: &ContactForm) -> String {
    let email = escape_html(form.email.trim());
    let subject = escape_html(&form.subject);
    let message = escape_html(&form.message);

    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #021024; border-bottom: 2px solid #718355; padding-bottom: 10px;">New Contact from Portfolio</h2>
  <p><strong>From:</strong> {email}</p>
  <p><strong>Subject:</strong> {subject}</p>
  <div style="background-color: #E9F5DB; padding: 20px; border-radius: 8px; margin-top: 20px;">
    <p style="margin: 0; white-space: pre-wrap;">{message}</p>
  </div>
  <p style="color: #666; font-size: 12px; margin-top: 20px;">This email was sent from your portfolio contact form.</p>
</div>"#
    )
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
