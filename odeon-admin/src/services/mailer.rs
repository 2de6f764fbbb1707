//! Best-effort mail notification
//!
//! Dispatch is fire-and-forget relative to the HTTP response: callers hand
//! a message to the cloneable handle and move on; an actor task owns the
//! transport and drains the queue. A failed send is logged and never
//! surfaces to the caller.

use anyhow::Result;
use async_trait::async_trait;
use lettre::{message::Mailbox, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const QUEUE_CAPACITY: usize = 64;

/// A rendered outbound mail, one recipient per dispatch
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Transport seam so tests can record instead of speaking SMTP
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &MailMessage) -> Result<()>;
}

/// SMTP transport with a fixed sender identity
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp_url: &str, mail_from: &str) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(smtp_url)?.build();
        let from: Mailbox = mail_from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid mail_from address: {}", e))?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &MailMessage) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail
                .to
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid recipient address: {}", e))?)
            .subject(&mail.subject)
            .body(mail.body.clone())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Cloneable fire-and-forget handle to the mailer actor
#[derive(Clone)]
pub struct MailerHandle {
    sender: mpsc::Sender<MailMessage>,
}

impl MailerHandle {
    /// Queue a mail for dispatch. Never blocks the caller; a full or
    /// closed queue is logged and dropped.
    pub fn enqueue(&self, mail: MailMessage) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if sender.send(mail).await.is_err() {
                error!("Mailer queue closed; notification dropped");
            }
        });
    }
}

/// Spawn the mailer actor and return its handle
pub fn spawn_mailer(transport: std::sync::Arc<dyn MailTransport>) -> MailerHandle {
    let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
    tokio::spawn(run_actor(transport, receiver));
    MailerHandle { sender }
}

async fn run_actor(
    transport: std::sync::Arc<dyn MailTransport>,
    mut receiver: mpsc::Receiver<MailMessage>,
) {
    info!("Mailer actor started");
    while let Some(mail) = receiver.recv().await {
        match transport.send(&mail).await {
            Ok(()) => debug!(to = %mail.to, subject = %mail.subject, "Notification mail sent"),
            Err(e) => error!(to = %mail.to, error = %e, "Failed to send notification mail"),
        }
    }
    info!("Mailer actor stopped");
}

/// Render the book-registration notification for one requester
///
/// The HTML body of the web notification reduces to this plain text; mail
/// goes out as plain text with a fixed sender.
pub fn render_registration_mail(to: &str, nickname: &str, book_title: &str) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        subject: "[Odeon] Your requested book has been registered".to_string(),
        body: format!(
            "Hello {nickname},\n\n\
             The book you requested, \"{book_title}\", is now available in the \
             Odeon catalog.\n\n\
             Happy listening,\nThe Odeon team\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct RecordingTransport {
        sent: Mutex<Vec<MailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, mail: &MailMessage) -> Result<()> {
            if self.fail {
                anyhow::bail!("SMTP unreachable");
            }
            self.sent.lock().await.push(mail.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_enqueue_delivers_through_transport() {
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let handle = spawn_mailer(transport.clone());

        handle.enqueue(render_registration_mail(
            "reader@example.com",
            "reader",
            "The Trial",
        ));

        // Give the actor a moment to drain the queue.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "reader@example.com");
        assert!(sent[0].body.contains("The Trial"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let handle = spawn_mailer(transport);

        // Must not panic or surface anywhere.
        handle.enqueue(render_registration_mail("a@example.com", "a", "B"));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[test]
    fn test_rendered_mail_addresses_requester() {
        let mail = render_registration_mail("r@example.com", "bookworm", "Dune");
        assert!(mail.body.contains("bookworm"));
        assert!(mail.body.contains("Dune"));
        assert!(mail.subject.contains("registered"));
    }
}
