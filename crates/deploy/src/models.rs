use serde::{Deserialize, Serialize};

/// What kind of workload a deployment request drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployKind {
    Application,
    Migration,
    Job,
}

/// An artifact the service should act on, with an optional pinned version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub name: String,
    /// Empty means "whatever the feed currently holds".
    #[serde(default)]
    pub version: String,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: name.into(), version: version.into() }
    }
}

/// A deployment request. The same shape drives application deploys, database
/// migrations, and one-off jobs; `kind` selects the workload and `artifacts`
/// carries the subject list (services, databases, or the single job).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub kind: DeployKind,
    pub namespace: String,
    pub environment: String,
    /// Explicit subset to act on; empty means everything in the namespace.
    pub artifacts: Vec<ArtifactSpec>,
    pub dry_run: bool,
    pub force: bool,
    /// Display name of the operator who asked, for the audit trail.
    pub requested_by: String,
}

/// A feed-to-feed artifact promotion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub artifact: ArtifactSpec,
    pub from_feed: String,
    pub to_feed: String,
    pub requested_by: String,
}

/// A metadata write against one service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub service: String,
    pub namespace: String,
    pub environment: String,
    /// Verbatim `key=value` entries as the operator typed them.
    pub entries: Vec<String>,
    pub requested_by: String,
}

/// What the service had to say about an accepted request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOutcome {
    /// Informational lines to relay to the requesting thread; may be empty.
    pub messages: Vec<String>,
}

impl ApiOutcome {
    pub fn with_messages(messages: Vec<String>) -> Self {
        Self { messages }
    }
}
