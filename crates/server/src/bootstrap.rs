use std::sync::Arc;
use std::time::Duration;

use bosun_core::{AppConfig, AuthPolicy, ConfigError, LoadOptions};
use bosun_deploy::{DeploymentApi, NoopDeploymentApi};
use bosun_ops::{Executor, WorkerPool};
use bosun_slack::{
    ChatProvider, CommandGateway, EventLoop, NoopChatProvider, NoopEventSource, ReconnectPolicy,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub gateway: Arc<CommandGateway>,
    pub event_loop: EventLoop,
    pub pool: Option<Arc<WorkerPool>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Wires the command pipeline in runtime dependency order: worker pool,
/// then the executor that submits to it, then the gateway that dispatches
/// to the executor, then the event loop that feeds the gateway.
///
/// The chat provider, deployment API, and event source are the inert
/// in-tree implementations; production clients implement the same traits
/// and slot in here.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let provider: Arc<dyn ChatProvider> = Arc::new(NoopChatProvider);
    let api: Arc<dyn DeploymentApi> = Arc::new(NoopDeploymentApi);

    let pool = if config.pool.enabled {
        let pool = Arc::new(WorkerPool::start(config.pool.workers, config.pool.queue_depth));
        info!(
            event_name = "system.bootstrap.pool_ready",
            correlation_id = "bootstrap",
            workers = pool.worker_count(),
            queue_depth = config.pool.queue_depth,
            "worker pool attached"
        );
        Some(pool)
    } else {
        info!(
            event_name = "system.bootstrap.pool_disabled",
            correlation_id = "bootstrap",
            "handlers will run inline on the dispatch task"
        );
        None
    };

    let mut executor = Executor::new(
        Arc::clone(&api),
        Arc::clone(&provider),
        Duration::from_secs(config.deploy.timeout_secs),
        config.slack.monitoring_channel.clone(),
        config.auth.allowed_channels.clone(),
    );
    if let Some(pool) = &pool {
        executor = executor.with_pool(Arc::clone(pool));
    }

    let gateway = Arc::new(CommandGateway::new(
        Arc::clone(&provider),
        Arc::new(executor),
        AuthPolicy::new(config.auth.allowed_channels.clone()),
        config.slack.monitoring_channel.clone(),
    ));

    let event_loop =
        EventLoop::new(Arc::new(NoopEventSource), Arc::clone(&gateway), ReconnectPolicy::default());

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        transport = "noop",
        pooled = pool.is_some(),
        "application bootstrap complete"
    );

    Ok(Application { config, gateway, event_loop, pool })
}
