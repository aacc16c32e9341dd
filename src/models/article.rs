//! Articles and the brief projection mirrored into the metadata index.

use serde::{Deserialize, Serialize};

/// The reduced `{uuid, title, created_time}` view of an article kept in
/// `Metadata.articles`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ArticleBrief {
    /// Immutable identifier; also the article's key segment.
    pub uuid: String,

    pub title: String,

    /// Creation time in epoch seconds.
    pub created_time: f64,
}

/// A full article as stored under `articles/{uuid}/{current,stage,backup}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Article {
    pub uuid: String,
    pub title: String,
    pub created_time: f64,

    /// Markdown body.
    pub content: String,

    /// Last edit time in epoch seconds.
    pub updated_time: f64,
}

impl Article {
    /// Project this article onto the brief stored in the index.
    pub fn brief(&self) -> ArticleBrief {
        ArticleBrief {
            uuid: self.uuid.clone(),
            title: self.title.clone(),
            created_time: self.created_time,
        }
    }
}

/// The three object slots every article owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArticleSlot {
    /// Published version. Its presence is the existence check for the article.
    Current,
    /// Pending draft.
    Stage,
    /// The `current` that was replaced by the last update.
    Backup,
}

impl ArticleSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Stage => "stage",
            Self::Backup => "backup",
        }
    }
}
