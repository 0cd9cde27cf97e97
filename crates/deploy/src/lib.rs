//! The deployment service seam: request/response models and the async trait
//! the command handlers call. The HTTP client that implements it for the
//! real service lives outside this workspace.

pub mod api;
pub mod models;

pub use api::{ApiError, DeploymentApi, NoopDeploymentApi};
pub use models::{
    ApiOutcome, ArtifactSpec, DeployKind, DeployRequest, MetadataUpdate, ReleaseRequest,
};
