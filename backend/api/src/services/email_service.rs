/// Transactional email delivery over SMTP
///
/// Delivery is best-effort: callers schedule sends on detached tasks, and a
/// send that exhausts its retries is logged there, never surfaced back into
/// the request that triggered it.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;

const MAX_RETRIES: u32 = 3;
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_use_ssl: bool,
    pub from_name: String,
    pub frontend_url: String,
}

impl From<&Config> for EmailConfig {
    fn from(config: &Config) -> Self {
        EmailConfig {
            smtp_host: config.smtp_host.clone(),
            smtp_port: config.smtp_port,
            smtp_user: config.smtp_user.clone(),
            smtp_password: config.smtp_password.clone(),
            smtp_use_ssl: config.smtp_use_ssl,
            from_name: config.email_from_name.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }
}

impl EmailConfig {
    fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.smtp_host, &self.smtp_user, &self.smtp_password) {
            (Some(host), Some(user), Some(password)) => Some((host, user, password)),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let transport = match config.credentials() {
            Some((host, user, password)) => {
                let creds = Credentials::new(user.to_string(), password.to_string());
                let builder = if config.smtp_use_ssl {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                }
                .context("failed to build SMTP transport")?;
                Some(
                    builder
                        .port(config.smtp_port)
                        .credentials(creds)
                        .timeout(Some(SMTP_TIMEOUT))
                        .build(),
                )
            }
            None => None,
        };

        Ok(EmailService {
            config: Arc::new(config),
            transport,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send_verification_email(&self, email: &str, token: &str, name: &str) -> Result<()> {
        if !self.is_configured() {
            tracing::warn!(%email, "SMTP not configured, skipping verification email (token: {token})");
            return Ok(());
        }

        let url = format!("{}/auth/verify-email?token={}", self.config.frontend_url, token);
        let (text_body, html_body) = verification_bodies(name, &url);
        self.send_with_retry(email, "Confirm Your Email - Activate Your Skillforge Account", text_body, html_body)
            .await
    }

    pub async fn send_password_reset_email(&self, email: &str, token: &str, name: &str) -> Result<()> {
        if !self.is_configured() {
            tracing::warn!(%email, "SMTP not configured, skipping password reset email (token: {token})");
            return Ok(());
        }

        let url = format!("{}/auth/reset-password?token={}", self.config.frontend_url, token);
        let (text_body, html_body) = reset_bodies(name, &url);
        self.send_with_retry(email, "Reset Your Skillforge Password", text_body, html_body)
            .await
    }

    /// Verify the transport can connect and authenticate.
    pub async fn test_connection(&self) -> bool {
        match &self.transport {
            Some(transport) => transport.test_connection().await.unwrap_or(false),
            None => false,
        }
    }

    async fn send_with_retry(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<()> {
        let mut backoff = Duration::from_secs(1);
        for attempt in 1..=MAX_RETRIES {
            match self.send(to_email, subject, &text_body, &html_body).await {
                Ok(()) => {
                    tracing::info!(%to_email, "email sent");
                    return Ok(());
                }
                Err(err) if attempt < MAX_RETRIES => {
                    tracing::warn!(%to_email, attempt, %err, "email delivery failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => {
                    tracing::error!(%to_email, %err, "email delivery failed after {MAX_RETRIES} attempts");
                    return Err(err);
                }
            }
        }
        unreachable!("retry loop always returns")
    }

    async fn send(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<()> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| anyhow!("SMTP transport not configured"))?;
        let from_user = self
            .config
            .smtp_user
            .as_deref()
            .ok_or_else(|| anyhow!("SMTP user not configured"))?;

        let from = format!("{} <{}>", self.config.from_name, from_user)
            .parse()
            .map_err(|e| anyhow!("invalid from address: {e}"))?;
        let to = to_email
            .parse()
            .map_err(|e| anyhow!("invalid recipient address: {e}"))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .context("failed to build email message")?;

        transport
            .send(message)
            .await
            .context("failed to send email")?;
        Ok(())
    }
}

fn verification_bodies(name: &str, url: &str) -> (String, String) {
    let text = format!(
        r#"Hi {name},

Welcome to Skillforge - where your journey in data science, machine
learning, and business intelligence begins.

To activate your account, please verify your email by visiting:

{url}

This link expires in 7 days.

If you didn't create a Skillforge account, you can safely ignore this
message.

- The Skillforge Team
"#
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #2575fc; color: white; padding: 20px; text-align: center; border-radius: 5px 5px 0 0; }}
        .content {{ background-color: #f9f9f9; padding: 20px; border-radius: 0 0 5px 5px; }}
        .button {{ display: inline-block; background-color: #2575fc; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; margin: 20px 0; }}
        .link-box {{ word-break: break-all; background-color: #eee; padding: 10px; border-radius: 4px; }}
        .footer {{ margin-top: 20px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Welcome to Skillforge</h1>
        </div>
        <div class="content">
            <p>Hi <strong>{name}</strong>,</p>
            <p>Thank you for signing up! To activate your account, please verify your email address:</p>
            <p style="text-align: center;">
                <a href="{url}" class="button">Verify My Email</a>
            </p>
            <p>If the button doesn't work, copy and paste this link into your browser:</p>
            <p class="link-box">{url}</p>
            <p style="color: #666; font-size: 14px;">
                For your security, this link will expire in <strong>7 days</strong>.
                If you didn't create this account, you can safely ignore this email.
            </p>
            <div class="footer">
                <p>The Skillforge Team</p>
            </div>
        </div>
    </div>
</body>
</html>
"#
    );

    (text, html)
}

fn reset_bodies(name: &str, url: &str) -> (String, String) {
    let text = format!(
        r#"Hi {name},

We received a request to reset your Skillforge password.

To reset your password, visit this link:

{url}

This link will expire in 24 hours.

If you didn't request a password reset, please ignore this email. Your
account remains secure and no changes have been made.

- The Skillforge Team
"#
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #dd2476; color: white; padding: 20px; text-align: center; border-radius: 5px 5px 0 0; }}
        .content {{ background-color: #f9f9f9; padding: 20px; border-radius: 0 0 5px 5px; }}
        .button {{ display: inline-block; background-color: #dd2476; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; margin: 20px 0; }}
        .link-box {{ word-break: break-all; background-color: #eee; padding: 10px; border-radius: 4px; }}
        .warning {{ background-color: #fff3cd; border: 1px solid #ffc107; color: #856404; padding: 10px; border-radius: 4px; margin: 15px 0; }}
        .footer {{ margin-top: 20px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Password Reset Request</h1>
        </div>
        <div class="content">
            <p>Hi <strong>{name}</strong>,</p>
            <p>We received a request to reset your Skillforge password. Click the button below to create a new password:</p>
            <p style="text-align: center;">
                <a href="{url}" class="button">Reset Password</a>
            </p>
            <p>If that doesn't work, copy and paste this link into your browser:</p>
            <p class="link-box">{url}</p>
            <div class="warning">
                This link will expire in <strong>24 hours</strong>.
                If you didn't request a password reset, you can safely ignore this email.
                Your account is secure and no changes have been made.
            </div>
            <div class="footer">
                <p>The Skillforge Team</p>
            </div>
        </div>
    </div>
</body>
</html>
"#
    );

    (text, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> EmailConfig {
        EmailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_password: None,
            smtp_use_ssl: false,
            from_name: "Skillforge".to_string(),
            frontend_url: "http://localhost:3001".to_string(),
        }
    }

    #[test]
    fn service_without_smtp_config_is_unconfigured() {
        let service = EmailService::new(unconfigured()).expect("service");
        assert!(!service.is_configured());
    }

    #[tokio::test]
    async fn unconfigured_send_is_a_no_op() {
        let service = EmailService::new(unconfigured()).expect("service");
        let sent = service
            .send_verification_email("a@x.com", "token", "Ada")
            .await;
        assert!(sent.is_ok());
        assert!(!service.test_connection().await);
    }

    #[test]
    fn bodies_embed_the_link() {
        let url = "http://localhost:3001/auth/verify-email?token=abc";
        let (text, html) = verification_bodies("Ada", url);
        assert!(text.contains(url));
        assert!(html.contains(url));

        let reset_url = "http://localhost:3001/auth/reset-password?token=abc";
        let (text, html) = reset_bodies("Ada", reset_url);
        assert!(text.contains(reset_url));
        assert!(html.contains(reset_url));
    }
}
