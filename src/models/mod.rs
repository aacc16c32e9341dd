//! Core data models for the blog content store.
//!
//! Everything here serializes naturally as JSON via `serde`; the index
//! objects (`Metadata`, `AttachmentList`) and article objects are stored
//! exactly as these types encode them.

pub mod article;
pub mod attachment;
pub mod object;
pub mod site;
pub mod validation;
