//! The execution side of a dispatched command: an exhaustive match over the
//! command sum type, one handler per executable variant. Adding a variant
//! without routing it here is a compile error, not a runtime surprise.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use bosun_core::command::Command;
use bosun_deploy::DeploymentApi;
use bosun_slack::gateway::CommandRunner;
use bosun_slack::provider::ChatProvider;

use crate::handlers::{self, HandlerContext};
use crate::pool::{WorkRequest, WorkerPool};

/// Runs authorized commands, inline or through the worker pool when one is
/// attached. Cheap to clone; everything behind it is shared.
#[derive(Clone)]
pub struct Executor {
    context: Arc<HandlerContext>,
    pool: Option<Arc<WorkerPool>>,
}

impl Executor {
    pub fn new(
        api: Arc<dyn DeploymentApi>,
        provider: Arc<dyn ChatProvider>,
        api_timeout: Duration,
        monitoring_channel: impl Into<String>,
        allowed_channels: Vec<String>,
    ) -> Self {
        Self {
            context: Arc::new(HandlerContext {
                api,
                provider,
                api_timeout,
                monitoring_channel: monitoring_channel.into(),
                allowed_channels,
            }),
            pool: None,
        }
    }

    /// Routes execution through `pool` instead of running inline. The pool's
    /// bounded queue then provides the backpressure story.
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }
}

#[async_trait]
impl CommandRunner for Executor {
    async fn run(&self, command: Command, ack_ts: String) {
        match &self.pool {
            Some(pool) => {
                let context = Arc::clone(&self.context);
                let request = WorkRequest::new(
                    command.context().channel_id.as_str(),
                    command.context().user_id.as_str(),
                    command.name(),
                )
                .with_job(async move {
                    execute(context.as_ref(), &command, &ack_ts).await;
                });
                if pool.submit(request).await.is_err() {
                    warn!(
                        event_name = "dispatch.pool_closed",
                        "worker pool is shut down; dropping the command"
                    );
                }
            }
            None => execute(self.context.as_ref(), &command, &ack_ts).await,
        }
    }
}

async fn execute(context: &HandlerContext, command: &Command, ack_ts: &str) {
    match command {
        Command::Deploy(_) => handlers::deploy::deploy(context, command, ack_ts).await,
        Command::Migrate(_) => handlers::deploy::migrate(context, command, ack_ts).await,
        Command::Restart(_) => handlers::deploy::restart(context, command, ack_ts).await,
        Command::Run(_) => handlers::deploy::run(context, command, ack_ts).await,
        Command::Release(_) => handlers::release::release(context, command, ack_ts).await,
        Command::Show(_) => handlers::inventory::show(context, command, ack_ts).await,
        Command::Set(_) => handlers::admin::set_metadata(context, command, ack_ts).await,
        Command::Delete(_) => handlers::admin::delete(context, command, ack_ts).await,
        Command::Auth(_) => handlers::admin::auth(context, command, ack_ts).await,
        Command::Help(_) | Command::Root(_) | Command::Invalid(_) => {
            dispatch_failure(context, command, ack_ts).await;
        }
    }
}

/// The acknowledgement path never forwards non-executable variants; one
/// arriving here is a wiring defect and gets an operator diagnostic.
async fn dispatch_failure(context: &HandlerContext, command: &Command, thread_ts: &str) {
    error!(
        event_name = "dispatch.not_executable",
        command = command.name(),
        "non-executable command reached the executor"
    );
    let text = format!(
        ":warning: `{}` reached the executor without a handler. This is a bot defect, not a problem with the command.",
        command.name()
    );
    if let Err(chat_error) = context
        .provider
        .error_notification_thread(&text, &command.context().channel_id, thread_ts)
        .await
    {
        warn!(
            event_name = "chat.notify_failed",
            channel = %command.context().channel_id,
            error = %chat_error,
            "could not post the dispatch diagnostic"
        );
    }
}
