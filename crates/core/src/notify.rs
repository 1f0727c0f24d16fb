//! The "link to your file" email.

use std::sync::Arc;

use blobmail_shared::{EmailError, EmailSender};

/// Default subject of the link email.
pub const LINK_EMAIL_SUBJECT: &str = "Link to your file";

/// Sends download links to uploaders.
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
    from: String,
    subject: String,
}

impl Notifier {
    /// Create a notifier sending as `from`.
    #[must_use]
    pub fn new(sender: Arc<dyn EmailSender>, from: impl Into<String>) -> Self {
        Self {
            sender,
            from: from.into(),
            subject: LINK_EMAIL_SUBJECT.to_string(),
        }
    }

    /// Override the subject line.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Email `url` to `receiver`.
    ///
    /// # Errors
    ///
    /// Returns the email capability's error unchanged.
    pub async fn notify(&self, receiver: &str, url: &str) -> Result<(), EmailError> {
        let body = compose_link_email(url);
        self.sender
            .send(&self.from, receiver, &self.subject, &body)
            .await
    }
}

/// HTML body announcing a one-hour download link.
#[must_use]
pub fn compose_link_email(url: &str) -> String {
    let url = escape_html(url);
    format!(
        "<html><body>\
         <h2>Link to your file</h2>\
         <p>Your file was successfully uploaded to the blob storage. \
         To get access to your file, use the following link: \
         <br><a href=\"{url}\">{url}</a>\
         <br>This link is available for one hour.</p>\
         </body></html>"
    )
}

fn escape_html(input: &str) -> String {
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
