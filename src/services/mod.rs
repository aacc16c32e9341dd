//! Content services: the object store backends, the index objects and the
//! repositories that keep them consistent.

pub mod article_repository;
pub mod attachment_repository;
pub mod blog_service;
pub mod content_error;
pub mod disk_store;
pub mod keyspace;
pub mod memory_store;
pub mod metadata_store;
pub mod object_store;
pub mod recovery;

#[cfg(test)]
pub(crate) mod testing;
