//! Issue an HTTP POST from a UI component and track its status.
//!
//! The [`PostRequestController`] owns the most recently requested
//! [`RequestTarget`], fires a POST whenever that target is replaced, and
//! publishes a [`RequestStatus`] that only the newest attempt may update.

pub mod attempt;
pub mod client;
pub mod controller;
pub mod diagnostics;
pub mod status;
pub mod target;

pub use attempt::{post_attempt, start_attempt};
pub use client::{
    ClientConfig, ClientError, ConfigError, PostClient, ReqwestPostClient,
    RequestConfig,
};
pub use controller::{PostRequestController, PostRequestControllerBuilder};
pub use diagnostics::{DiagnosticSink, TracingSink};
pub use status::{PostAction, PostPhase, RequestStatus};
pub use target::{CancelFlag, RequestTarget, TargetRef, TargetWatch, is_truthy};

pub use serde_json::Value;

/// Runs a spawned attempt to completion on the caller's local executor.
///
/// Any `Fn(LocalBoxFuture<'static, ()>)` works, e.g. a closure around
/// `tokio::task::spawn_local` inside a `LocalSet`, or around
/// `yew::platform::spawn_local` in the browser.
pub trait Spawner {
    fn spawn_local(&self, task: futures::future::LocalBoxFuture<'static, ()>);
}

impl<F> Spawner for F
where
    F: Fn(futures::future::LocalBoxFuture<'static, ()>),
{
    fn spawn_local(&self, task: futures::future::LocalBoxFuture<'static, ()>) {
        self(task)
    }
}
