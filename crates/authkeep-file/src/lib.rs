//! authkeep-file - Filesystem-backed credential storage.
//!
//! Secrets and user data are kept in two JSON files inside one directory.
//! Use [`open`] to get a [`CredentialStore`] over both.

mod store;

pub use store::FileStore;

use std::path::Path;
use std::sync::Arc;

use authkeep_core::CredentialStore;

/// Open the credential store rooted at `dir`.
///
/// Tokens go to [`FileStore::SECURE_FILE`], readable by the owner only on
/// Unix. Cached user data goes to [`FileStore::PLAIN_FILE`]. Nothing is
/// created until the first write.
pub fn open(dir: impl AsRef<Path>) -> CredentialStore {
    let dir = dir.as_ref();
    CredentialStore::new(
        Arc::new(FileStore::secure(dir)),
        Arc::new(FileStore::plain(dir)),
    )
}
