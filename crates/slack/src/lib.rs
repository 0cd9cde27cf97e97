//! Slack Integration - chat-facing surface of bosun
//!
//! This crate owns everything between the chat workspace and command
//! execution:
//! - **Provider** (`provider`) - the workspace API seam (posting, user and
//!   channel lookups, notification threads)
//! - **Gateway** (`gateway`) - resolve a mention, authorize it, acknowledge
//!   it, then dispatch it without blocking the event path
//! - **Transport** (`transport`) - the event loop that pulls mentions off the
//!   wire and survives disconnects
//!
//! # Architecture
//!
//! ```text
//! Chat Events → EventLoop → CommandGateway → CommandRunner (spawned)
//!                               ↓
//!                        acknowledgement ← AuthPolicy
//! ```
//!
//! # Key Types
//!
//! - `EventLoop` - transport pump with reconnection logic
//! - `CommandGateway` - the resolve/authorize/ack/dispatch pipeline
//! - `ChatProvider` - trait over the workspace API
//! - `CommandRunner` - trait the execution side implements

pub mod gateway;
pub mod provider;
pub mod transport;

pub use gateway::{ChatCommandEvent, CommandGateway, CommandRunner, Disposition, NoopCommandRunner};
pub use provider::{
    escalate_to_monitoring, ChannelInfo, ChatError, ChatProvider, ChatUser, NoopChatProvider,
};
pub use transport::{EventLoop, EventSource, NoopEventSource, ReconnectPolicy, TransportError};
