// Bookmark editor services
// Stateless building blocks: projection, visibility, validation, submission and the backends.

pub mod backend;
pub mod http_backend;
pub mod local_backend;
pub mod notifier;
pub mod projection;
pub mod settings_engine;
pub mod submission;
pub mod validation;
pub mod visibility;
