// ABOUTME: Transactional email delivery for lead notifications and auto-replies
// ABOUTME: SMTP relay in production, file transport for local development

//! Email notification service.
//!
//! Sends the operator a notification for each new lead (with reply-to set
//! to the submitter) and an auto-reply back to the submitter. Transport is
//! SMTP when `SMTP_HOST` is configured, otherwise a file transport that
//! writes `.eml` files to `EMAIL_FILE_DIR`.

use crate::config::environment::EmailConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{NewChatMessage, NewSubmission};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::Path;

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

/// Email notification service
pub struct EmailNotifier {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    operator_email: Option<String>,
}

impl EmailNotifier {
    /// Build a notifier from configuration, or `None` when no transport
    /// is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay is unreachable by name or the
    /// file transport directory cannot be created.
    pub fn from_config(config: &EmailConfig) -> AppResult<Option<Self>> {
        let transport = if let Some(host) = &config.smtp_host {
            let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| AppError::config(format!("invalid SMTP relay {host}: {e}")))?
                .port(config.smtp_port)
                .credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ));
            EmailTransport::Smtp(builder.build())
        } else if let Some(dir) = &config.file_dir {
            let dir = Path::new(dir);
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| AppError::config(format!("create email directory: {e}")))?;
            }
            EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
        } else {
            return Ok(None);
        };

        Ok(Some(Self {
            transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            operator_email: config.operator_email.clone(),
        }))
    }

    /// Notify the operator about a new contact form submission.
    ///
    /// # Errors
    ///
    /// Returns an error if message construction or delivery fails.
    pub async fn send_submission_notification(&self, submission: &NewSubmission) -> AppResult<()> {
        let Some(operator) = &self.operator_email else {
            tracing::debug!("no operator email configured, skipping notification");
            return Ok(());
        };

        let subject = format!("New lead: {} ({})", submission.business_name, submission.name);
        let text = submission_notification_text(submission);
        let html = submission_notification_html(submission);

        let message = self
            .builder(operator, None)?
            .reply_to(parse_mailbox(&submission.email, Some(&submission.name))?)
            .subject(subject)
            .multipart(html_and_text(html, text))
            .map_err(|e| AppError::internal(format!("build notification email: {e}")))?;

        self.send(message).await
    }

    /// Send the submitter an auto-reply confirming receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if message construction or delivery fails.
    pub async fn send_submission_auto_reply(&self, submission: &NewSubmission) -> AppResult<()> {
        let text = format!(
            "Hi {},\n\n\
             Thanks for reaching out about the {} package. We received your \
             request for {} and will get back to you within one business day.\n\n\
             {}",
            submission.name, submission.package, submission.business_name, self.from_name
        );
        let html = format!(
            "<p>Hi {},</p>\
             <p>Thanks for reaching out about the <strong>{}</strong> package. \
             We received your request for <strong>{}</strong> and will get back \
             to you within one business day.</p>\
             <p>{}</p>",
            escape_html(&submission.name),
            escape_html(submission.package.as_str()),
            escape_html(&submission.business_name),
            escape_html(&self.from_name)
        );

        let message = self
            .builder(&submission.email, Some(&submission.name))?
            .subject("We received your request")
            .multipart(html_and_text(html, text))
            .map_err(|e| AppError::internal(format!("build auto-reply email: {e}")))?;

        self.send(message).await
    }

    /// Notify the operator about a chat message from an identified visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if message construction or delivery fails.
    pub async fn send_chat_notification(&self, chat: &NewChatMessage) -> AppResult<()> {
        let Some(operator) = &self.operator_email else {
            tracing::debug!("no operator email configured, skipping chat notification");
            return Ok(());
        };

        let name = chat.user_name.as_deref().unwrap_or("Anonymous");
        let email = chat.user_email.as_deref().unwrap_or("unknown");

        let text = format!(
            "New chat message\n\nFrom: {name} <{email}>\nSession: {}\n\n{}",
            chat.session_id, chat.message
        );
        let html = format!(
            "<h2>New chat message</h2>\
             <p><strong>From:</strong> {} &lt;{}&gt;<br>\
             <strong>Session:</strong> {}</p>\
             <blockquote>{}</blockquote>",
            escape_html(name),
            escape_html(email),
            escape_html(&chat.session_id),
            escape_html(&chat.message)
        );

        let mut builder = self.builder(operator, None)?;
        if let Some(user_email) = &chat.user_email {
            builder = builder.reply_to(parse_mailbox(user_email, chat.user_name.as_deref())?);
        }

        let message = builder
            .subject(format!("New chat message from {name}"))
            .multipart(html_and_text(html, text))
            .map_err(|e| AppError::internal(format!("build chat email: {e}")))?;

        self.send(message).await
    }

    fn builder(
        &self,
        to_email: &str,
        to_name: Option<&str>,
    ) -> AppResult<lettre::message::MessageBuilder> {
        let from = parse_mailbox(&self.from_email, Some(&self.from_name))?;
        let to = parse_mailbox(to_email, to_name)?;
        Ok(Message::builder().from(from).to(to))
    }

    async fn send(&self, message: Message) -> AppResult<()> {
        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| AppError::external_service("smtp", e.to_string()))?;
            }
            EmailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| AppError::external_service("email-file", e.to_string()))?;
            }
        }
        Ok(())
    }
}

fn parse_mailbox(email: &str, name: Option<&str>) -> AppResult<Mailbox> {
    let raw = match name {
        Some(name) if !name.is_empty() => format!("{name} <{email}>"),
        _ => email.to_owned(),
    };
    raw.parse::<Mailbox>()
        .map_err(|e| AppError::internal(format!("invalid mailbox {email}: {e}")))
}

fn html_and_text(html: String, text: String) -> MultiPart {
    MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text),
        )
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html),
        )
}

fn submission_notification_text(s: &NewSubmission) -> String {
    let mut text = format!(
        "New contact form submission\n\n\
         Business: {}\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Package: {}\n\
         Description: {}\n",
        s.business_name, s.name, s.email, s.phone, s.package, s.business_description
    );
    if let Some(other) = &s.package_other {
        text.push_str(&format!("Package details: {other}\n"));
    }
    if let Some(has_site) = &s.has_existing_website {
        text.push_str(&format!("Existing website: {has_site}\n"));
    }
    if let Some(url) = &s.existing_website_url {
        text.push_str(&format!("Website URL: {url}\n"));
    }
    text
}

fn submission_notification_html(s: &NewSubmission) -> String {
    let mut rows = vec![
        ("Business", s.business_name.clone()),
        ("Name", s.name.clone()),
        ("Email", s.email.clone()),
        ("Phone", s.phone.clone()),
        ("Package", s.package.as_str().to_owned()),
        ("Description", s.business_description.clone()),
    ];
    if let Some(other) = &s.package_other {
        rows.push(("Package details", other.clone()));
    }
    if let Some(has_site) = &s.has_existing_website {
        rows.push(("Existing website", has_site.clone()));
    }
    if let Some(url) = &s.existing_website_url {
        rows.push(("Website URL", url.clone()));
    }

    let body: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><td><strong>{label}</strong></td><td>{}</td></tr>",
                escape_html(value)
            )
        })
        .collect();

    format!("<h2>New contact form submission</h2><table>{body}</table>")
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Package;

    fn sample_submission() -> NewSubmission {
        NewSubmission {
            business_name: "Acme Widgets".into(),
            name: "Jo Smith".into(),
            email: "jo@acme.test".into(),
            phone: "5550100".into(),
            business_description: "Widgets & gadgets".into(),
            package: Package::Growth,
            package_other: None,
            has_existing_website: Some("yes".into()),
            existing_website_url: Some("https://acme.test".into()),
        }
    }

    #[test]
    fn test_notification_text_includes_fields() {
        let text = submission_notification_text(&sample_submission());
        assert!(text.contains("Acme Widgets"));
        assert!(text.contains("jo@acme.test"));
        assert!(text.contains("Growth"));
        assert!(text.contains("https://acme.test"));
    }

    #[test]
    fn test_notification_html_escapes_input() {
        let mut submission = sample_submission();
        submission.business_name = "<script>alert(1)</script>".into();
        let html = submission_notification_html(&submission);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_mailbox_with_and_without_name() {
        assert!(parse_mailbox("jo@acme.test", Some("Jo Smith")).is_ok());
        assert!(parse_mailbox("jo@acme.test", None).is_ok());
        assert!(parse_mailbox("not an email", None).is_err());
    }

    #[tokio::test]
    async fn test_file_transport_writes_eml() {
        let dir = std::env::temp_dir().join("leadbox-email-test");
        let config = EmailConfig {
            file_dir: Some(dir.clone()),
            from_email: "no-reply@leadbox.test".into(),
            from_name: "Leadbox".into(),
            operator_email: Some("ops@leadbox.test".into()),
            ..EmailConfig::default()
        };

        let notifier = EmailNotifier::from_config(&config).unwrap().unwrap();
        notifier
            .send_submission_notification(&sample_submission())
            .await
            .unwrap();

        let wrote_file = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .any(|e| e.path().extension().is_some_and(|ext| ext == "eml"));
        assert!(wrote_file);
    }
}
