//! Contact form handling: validation and delivery.

mod form;
mod mailer;

pub use form::{ContactForm, FormError, MAX_MESSAGE_CHARS, MAX_SUBJECT_CHARS};
pub use mailer::{escape_html, render_html, Mailer, ResendMailer};
