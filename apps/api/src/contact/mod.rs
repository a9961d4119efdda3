// Contact form: validation, email templates, and the POST /api/contact handler.
// All outgoing mail goes through the `Mailer` held in AppState.

pub mod handlers;
pub mod models;
pub mod templates;
pub mod validation;
