//! Service layer for odeon-admin
//!
//! External-integration workflows: cache-aside metadata fetch, book
//! registration, and best-effort mail notification.

pub mod mailer;
pub mod metadata;
pub mod registrar;

pub use mailer::{MailMessage, MailTransport, MailerHandle};
pub use metadata::MetadataService;
pub use registrar::{RegisterError, Registrar};
