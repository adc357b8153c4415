use crate::document::UiSpecDocument;
use crate::error::StoreError;
use async_trait::async_trait;

/// Persistence collaborator for accepted documents.
///
/// The generator calls [`SpecStore::save`] after a successful widget-mode
/// generation. A failure is logged and never changes the returned result.
#[async_trait]
pub trait SpecStore: Send + Sync {
    async fn save(&self, document: &UiSpecDocument) -> Result<(), StoreError>;
}
