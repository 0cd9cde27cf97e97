use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ApiOutcome, DeployRequest, MetadataUpdate, ReleaseRequest};

/// Why a deployment service call failed. The rendered text is relayed to the
/// requesting thread verbatim; nothing here is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("deployment API rejected the request: {0}")]
    Rejected(String),
    #[error("deployment API is unreachable: {0}")]
    Unreachable(String),
    #[error("deployment API call timed out after {seconds}s")]
    TimedOut { seconds: u64 },
}

/// The deployment service as the handlers see it. Implementations own every
/// transport concern; this surface is pure request and response.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    async fn deploy(&self, request: DeployRequest) -> Result<ApiOutcome, ApiError>;

    async fn release(&self, request: ReleaseRequest) -> Result<ApiOutcome, ApiError>;

    async fn environments(&self) -> Result<Vec<String>, ApiError>;

    async fn namespaces(&self, environment: &str) -> Result<Vec<String>, ApiError>;

    async fn services(&self, namespace: &str, environment: &str)
        -> Result<Vec<String>, ApiError>;

    async fn set_metadata(&self, update: MetadataUpdate) -> Result<ApiOutcome, ApiError>;

    async fn delete_namespace(
        &self,
        namespace: &str,
        environment: &str,
        requested_by: &str,
    ) -> Result<ApiOutcome, ApiError>;
}

/// Accepts everything and reports nothing. Stands in wherever a real client
/// is not wired up, including most tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDeploymentApi;

#[async_trait]
impl DeploymentApi for NoopDeploymentApi {
    async fn deploy(&self, _request: DeployRequest) -> Result<ApiOutcome, ApiError> {
        Ok(ApiOutcome::default())
    }

    async fn release(&self, _request: ReleaseRequest) -> Result<ApiOutcome, ApiError> {
        Ok(ApiOutcome::default())
    }

    async fn environments(&self) -> Result<Vec<String>, ApiError> {
        Ok(Vec::new())
    }

    async fn namespaces(&self, _environment: &str) -> Result<Vec<String>, ApiError> {
        Ok(Vec::new())
    }

    async fn services(
        &self,
        _namespace: &str,
        _environment: &str,
    ) -> Result<Vec<String>, ApiError> {
        Ok(Vec::new())
    }

    async fn set_metadata(&self, _update: MetadataUpdate) -> Result<ApiOutcome, ApiError> {
        Ok(ApiOutcome::default())
    }

    async fn delete_namespace(
        &self,
        _namespace: &str,
        _environment: &str,
        _requested_by: &str,
    ) -> Result<ApiOutcome, ApiError> {
        Ok(ApiOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, DeploymentApi, NoopDeploymentApi};
    use crate::models::{ArtifactSpec, DeployKind, DeployRequest};

    #[tokio::test]
    async fn noop_api_accepts_requests_and_reports_nothing() {
        let api = NoopDeploymentApi;
        let outcome = api
            .deploy(DeployRequest {
                kind: DeployKind::Application,
                namespace: "current".to_owned(),
                environment: "qa".to_owned(),
                artifacts: vec![ArtifactSpec::new("web", "1.0")],
                dry_run: false,
                force: false,
                requested_by: "casey".to_owned(),
            })
            .await
            .expect("noop deploy succeeds");
        assert!(outcome.messages.is_empty());
        assert!(api.environments().await.expect("noop lookup succeeds").is_empty());
    }

    #[test]
    fn errors_render_operator_readable_text() {
        assert_eq!(
            ApiError::TimedOut { seconds: 30 }.to_string(),
            "deployment API call timed out after 30s"
        );
        assert_eq!(
            ApiError::Rejected("namespace is locked".to_owned()).to_string(),
            "deployment API rejected the request: namespace is locked"
        );
    }
}
