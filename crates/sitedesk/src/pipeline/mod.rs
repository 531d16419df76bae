//! Read-modify-write orchestration over the repository ports.
//!
//! Pipelines own no storage. Callers construct them with explicit repository and
//! clock dependencies and keep them for as long as they like.

pub mod index_update;
pub mod publish;
pub mod settings_update;

pub use index_update::{IndexUpdateOutcome, IndexUpdateRequest, SiteIndexUpdatePipeline};
pub use publish::{PublicationPipeline, PublicationResult, PublishRequest};
pub use settings_update::{SettingsUpdateOutcome, SettingsUpdatePipeline, SettingsUpdateRequest};
