//! Application layer containing the flow orchestration.
//!
//! Each flow is an async sequence of calls to the injected collaborators, with
//! every state change published through the `StateStore`. The `FlowRuntime`
//! routes intents to flows as independent `tokio` tasks and supervises the
//! quote poller.

pub mod poller;
pub mod resolver;
pub mod runtime;
pub mod send;
pub mod swap;
