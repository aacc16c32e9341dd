//! Site settings and the metadata index object that embeds them.

use serde::{Deserialize, Serialize};

use super::article::ArticleBrief;

/// Site-wide settings. Singleton, embedded in [`Metadata`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Site {
    pub title: String,
    pub description: String,
    /// GitHub handle.
    pub github: String,
    pub email: String,
    pub footer: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            title: "My Blog".into(),
            description: "This is my blog.".into(),
            github: String::new(),
            email: String::new(),
            footer: String::new(),
        }
    }
}

/// The denormalized metadata index.
///
/// Every brief in `articles` must have a matching `articles/{uuid}/current`
/// object. The reverse is not enforced.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Metadata {
    pub site: Site,
    pub articles: Vec<ArticleBrief>,
}
