//! Short-lived display references for in-memory image data.
//!
//! An [`ObjectUrl`] plays the role a `blob:` URL plays in a browser: it lets
//! the preview and the download affordance point at bytes that only live in
//! memory. Handles revoke themselves when dropped, so replacing an image
//! releases the previous reference.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const URL_PREFIX: &str = "blob:elongation/";

struct Entry {
    bytes: Arc<[u8]>,
    mime_type: String,
}

type Entries = Arc<Mutex<HashMap<Uuid, Entry>>>;

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    entries: Entries,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Arc<[u8]>, mime_type: impl Into<String>) -> ObjectUrl {
        let id = Uuid::new_v4();
        lock(&self.entries).insert(
            id,
            Entry {
                bytes,
                mime_type: mime_type.into(),
            },
        );
        log::debug!("Created object URL {}{}", URL_PREFIX, id);

        ObjectUrl {
            id,
            href: format!("{}{}", URL_PREFIX, id),
            entries: Arc::clone(&self.entries),
        }
    }

    pub fn resolve(&self, href: &str) -> Option<Arc<[u8]>> {
        let id = parse_href(href)?;
        lock(&self.entries)
            .get(&id)
            .map(|entry| Arc::clone(&entry.bytes))
    }

    /// Number of references that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        lock(&self.entries).len()
    }
}

impl fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

fn parse_href(href: &str) -> Option<Uuid> {
    href.strip_prefix(URL_PREFIX)
        .and_then(|id| Uuid::parse_str(id).ok())
}

/// Owned display reference. Not `Clone`: exactly one owner revokes it.
pub struct ObjectUrl {
    id: Uuid,
    href: String,
    entries: Entries,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.href
    }

    /// Self-contained `data:` URL for frontends that cannot dereference
    /// `blob:` handles.
    pub fn to_data_url(&self) -> Option<String> {
        let entries = lock(&self.entries);
        let entry = entries.get(&self.id)?;
        Some(format!(
            "data:{};base64,{}",
            entry.mime_type,
            STANDARD.encode(&entry.bytes)
        ))
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.href).finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}

impl PartialEq for ObjectUrl {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if lock(&self.entries).remove(&self.id).is_some() {
            log::debug!("Revoked object URL {}", self.href);
        }
    }
}
