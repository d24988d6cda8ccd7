// Bookmark editor state managers
// Stateful pieces: the form container, the edit dialog and the local bookmark store.

pub mod bookmark_store;
pub mod edit_dialog;
pub mod form_state;
