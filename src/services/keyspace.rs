//! Object key layout for one deployment.
//!
//! | Key                                      | Contents                    |
//! |------------------------------------------|-----------------------------|
//! | `metadata`, `metadata-bak`               | JSON `Metadata`             |
//! | `attachment-list`, `attachment-list-bak` | JSON `[Attachment]`         |
//! | `articles/{uuid}/{current,stage,backup}` | JSON `Article`              |
//! | `attachments/{filename}`                 | raw bytes                   |
//! | `avatar.png`                             | raw PNG bytes               |
//!
//! Every key is prefixed with the configured base directory.

use crate::models::article::ArticleSlot;

/// The two index objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Metadata,
    AttachmentList,
}

impl IndexKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::AttachmentList => "attachment-list",
        }
    }
}

/// Which copy of an index object a key refers to. Only one prior
/// generation is ever retained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    Current,
    Backup,
}

#[derive(Clone, Debug)]
pub struct Keyspace {
    base_dir: String,
}

impl Keyspace {
    pub fn new(base_dir: impl Into<String>) -> Self {
        let base_dir: String = base_dir.into();
        Self {
            base_dir: base_dir.trim_matches('/').to_string(),
        }
    }

    /// Resolve a path relative to the base directory.
    pub fn resolve(&self, path: &str) -> String {
        if self.base_dir.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.base_dir, path)
        }
    }

    pub fn index(&self, kind: IndexKind, generation: Generation) -> String {
        match generation {
            Generation::Current => self.resolve(kind.name()),
            Generation::Backup => self.resolve(&format!("{}-bak", kind.name())),
        }
    }

    pub fn article(&self, uuid: &str, slot: ArticleSlot) -> String {
        self.resolve(&format!("articles/{}/{}", uuid, slot.as_str()))
    }

    pub fn attachment(&self, filename: &str) -> String {
        self.resolve(&format!("attachments/{}", filename))
    }

    pub fn avatar(&self) -> String {
        self.resolve("avatar.png")
    }
}
