//! Scripted collaborators for controller tests.
//!
//! [`MockClient`] records every POST and either answers right away or
//! holds each call open until the test settles it by index, which makes
//! out-of-order completion easy to stage. [`RecordingSink`] keeps the
//! diagnostics it is handed.

use post_request::{
    ClientError, DiagnosticSink, PostClient, RequestConfig, RequestTarget,
};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use tokio::sync::oneshot;

pub const MOCK_FAILURE: &str = "mock failure";

type Reply = Result<Value, ClientError>;

#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub url: String,
    pub body: Value,
    pub config: RequestConfig,
}

#[derive(Debug, Clone)]
enum Mode {
    Manual,
    Succeed(Value),
    Fail,
}

struct MockState {
    mode: Mode,
    calls: Vec<MockCall>,
    pending: HashMap<usize, oneshot::Sender<Reply>>,
}

/// A cloneable handle; clones share the same call log.
#[derive(Clone)]
pub struct MockClient {
    state: Rc<RefCell<MockState>>,
}

impl MockClient {
    fn with_mode(mode: Mode) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                mode,
                calls: Vec::new(),
                pending: HashMap::new(),
            })),
        }
    }

    /// Every call stays in flight until [`resolve`](Self::resolve) or
    /// [`fail`](Self::fail) is called with its index.
    pub fn manual() -> Self {
        Self::with_mode(Mode::Manual)
    }

    /// Every call succeeds with `response`.
    pub fn succeeding(response: Value) -> Self {
        Self::with_mode(Mode::Succeed(response))
    }

    /// Every call fails with a 500.
    pub fn failing() -> Self {
        Self::with_mode(Mode::Fail)
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }

    /// Complete the call at `index` successfully.
    pub fn resolve(&self, index: usize, response: Value) {
        self.settle(index, Ok(response));
    }

    /// Complete the call at `index` with an error.
    pub fn fail(&self, index: usize) {
        self.settle(index, Err(mock_error()));
    }

    fn settle(&self, index: usize, reply: Reply) {
        let sender = self
            .state
            .borrow_mut()
            .pending
            .remove(&index)
            .unwrap_or_else(|| panic!("no pending mock call at index {index}"));
        // The attempt may already be gone if the controller was dropped
        let _ = sender.send(reply);
    }
}

impl PostClient for MockClient {
    type Config = RequestConfig;

    fn post(
        &self,
        url: &str,
        body: &Value,
        config: &RequestConfig,
    ) -> impl Future<Output = Result<Value, ClientError>> {
        let (sender, receiver) = oneshot::channel();

        {
            let mut state = self.state.borrow_mut();
            let index = state.calls.len();
            state.calls.push(MockCall {
                url: url.to_string(),
                body: body.clone(),
                config: config.clone(),
            });

            match state.mode.clone() {
                Mode::Manual => {
                    state.pending.insert(index, sender);
                }
                Mode::Succeed(response) => {
                    let _ = sender.send(Ok(response));
                }
                Mode::Fail => {
                    let _ = sender.send(Err(mock_error()));
                }
            }
        }

        async move { receiver.await.unwrap_or_else(|_| Err(mock_error())) }
    }
}

fn mock_error() -> ClientError {
    ClientError::APIError(
        reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        MOCK_FAILURE.to_string(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub url: Option<String>,
    pub message: String,
}

/// A [`DiagnosticSink`] that keeps what it is given.
#[derive(Clone, Default)]
pub struct RecordingSink {
    reports: Rc<RefCell<Vec<Report>>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, target: &RequestTarget, error: &ClientError) {
        self.reports.borrow_mut().push(Report {
            url: target.url.clone(),
            message: error.to_string(),
        });
    }
}
