//! Recovery and initialization of the index objects.

use serde::Serialize;
use tracing::{info, warn};

use super::{
    content_error::ContentResult,
    metadata_store::MetadataStore,
};
use crate::models::site::Metadata;

/// Which index objects a recovery run restored.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub metadata: bool,
    pub attachment_list: bool,
}

/// Copy each index's backup generation over its current one.
///
/// `metadata` is restored first, then `attachment-list`. The two restores are
/// not coupled: when the second fails (e.g. its backup is missing) the first
/// stays applied and the second error is returned.
pub async fn recover(index: &MetadataStore) -> ContentResult<RecoveryReport> {
    let mut report = RecoveryReport::default();

    index.metadata.restore_backup().await?;
    report.metadata = true;
    info!(index = index.metadata.kind().name(), "index restored from backup");

    if let Err(err) = index.attachments.restore_backup().await {
        warn!(error = %err, restored = ?report, "recovery stopped part way");
        return Err(err);
    }
    report.attachment_list = true;
    info!(index = index.attachments.kind().name(), "index restored from backup");

    Ok(report)
}

/// Overwrite both indexes with their empty defaults.
///
/// Destructive: on a populated deployment the existing article and
/// attachment objects stay behind but are no longer referenced by any index.
/// Backups are left untouched.
pub async fn initialize(index: &MetadataStore) -> ContentResult<()> {
    index.metadata.overwrite(&Metadata::default()).await?;
    index.attachments.overwrite(&Vec::new()).await?;
    info!("indexes initialized");
    Ok(())
}
