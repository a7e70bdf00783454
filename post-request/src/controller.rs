use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::{
    DiagnosticSink, PostAction, PostClient, RequestStatus, RequestTarget,
    Spawner, TargetRef, TargetWatch, TracingSink, start_attempt,
};

type Listener = Rc<dyn Fn(&RequestStatus)>;

/// Fires a POST whenever the caller replaces the target, and publishes the
/// status of the newest attempt.
///
/// Results of superseded attempts are discarded; the request itself is not
/// aborted.
///
/// # Example
///
/// ```rust,ignore
/// let controller = PostRequestController::builder(
///     ReqwestPostClient::new(Some("http://127.0.0.1:8000".into())),
///     |task: LocalBoxFuture<'static, ()>| {
///         tokio::task::spawn_local(task);
///     },
/// )
/// .build();
///
/// controller.trigger("/api/echo", json!({"name": "alice"}));
/// assert!(controller.status().uploading);
/// ```
pub struct PostRequestController<C: PostClient + 'static> {
    inner: Rc<Inner<C>>,
}

struct Inner<C: PostClient> {
    client: Rc<C>,
    config: C::Config,
    sink: Rc<dyn DiagnosticSink>,
    spawner: Rc<dyn Spawner>,
    target: RefCell<TargetRef>,
    watch: RefCell<TargetWatch>,
    status: RefCell<RequestStatus>,
    listeners: RefCell<Vec<Listener>>,
    /// Statuses waiting to be delivered, oldest first.
    pending: RefCell<VecDeque<RequestStatus>>,
    notifying: Cell<bool>,
}

impl<C: PostClient + 'static> PostRequestController<C> {
    pub fn builder(
        client: C,
        spawner: impl Spawner + 'static,
    ) -> PostRequestControllerBuilder<C> {
        PostRequestControllerBuilder {
            client,
            spawner: Rc::new(spawner),
            config: C::Config::default(),
            sink: Rc::new(TracingSink::for_build()),
            initial: RequestTarget::default(),
        }
    }

    /// Replace the target with a new one, which schedules a new attempt.
    ///
    /// Always fires for a fire-eligible target, even when url and body equal
    /// the previous ones.
    pub fn trigger(&self, url: impl Into<String>, body: impl Into<Value>) {
        let target = TargetRef::new(RequestTarget::new(
            Some(url.into()),
            body.into(),
        ));
        tracing::debug!(url = target.url.as_deref(), "POST target replaced");

        *self.inner.target.borrow_mut() = target;
        self.inner.run_effect();
    }

    pub fn status(&self) -> RequestStatus {
        self.inner.status.borrow().clone()
    }

    pub fn target(&self) -> TargetRef {
        self.inner.target.borrow().clone()
    }

    /// Call `listener` after every status transition.
    ///
    /// Listeners may call `trigger`, `status` or `subscribe`. Transitions
    /// caused from inside a listener are delivered after the current one
    /// has reached every listener, so each listener sees statuses in order.
    pub fn subscribe(&self, listener: impl Fn(&RequestStatus) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }
}

impl<C: PostClient + 'static> Drop for PostRequestController<C> {
    fn drop(&mut self) {
        self.inner.watch.borrow_mut().cleanup();
    }
}

impl<C: PostClient + 'static> Inner<C> {
    /// Re-evaluate the current target; does nothing if its identity has not
    /// changed since the last run.
    fn run_effect(self: &Rc<Self>) {
        let target = self.target.borrow().clone();
        let Some(cancel) = self.watch.borrow_mut().observe(&target) else {
            return;
        };

        let state = Rc::downgrade(self);
        start_attempt(
            target,
            cancel,
            self.client.clone(),
            self.config.clone(),
            self.sink.clone(),
            &*self.spawner,
            move |action| {
                if let Some(state) = state.upgrade() {
                    state.dispatch(action);
                }
            },
        );
    }

    fn dispatch(&self, action: PostAction) {
        let next = self.status.borrow().reduce(action);
        self.status.replace(next.clone());
        tracing::debug!(phase = %next.phase(), "POST status changed");

        self.pending.borrow_mut().push_back(next);
        if self.notifying.replace(true) {
            // The outer dispatch drains the queue
            return;
        }

        loop {
            let Some(status) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            let listeners = self.listeners.borrow().clone();
            for listener in &listeners {
                listener(&status);
            }
        }
        self.notifying.set(false);
    }
}

/// Builder for [`PostRequestController`]. `build` mounts the controller.
pub struct PostRequestControllerBuilder<C: PostClient> {
    client: C,
    spawner: Rc<dyn Spawner>,
    config: C::Config,
    sink: Rc<dyn DiagnosticSink>,
    initial: RequestTarget,
}

impl<C: PostClient + 'static> PostRequestControllerBuilder<C> {
    /// POSTed on mount if fire-eligible.
    pub fn initial_target(
        mut self,
        url: Option<String>,
        body: impl Into<Value>,
    ) -> Self {
        self.initial = RequestTarget::new(url, body.into());
        self
    }

    /// Passed through to the client on every attempt.
    pub fn config(mut self, config: C::Config) -> Self {
        self.config = config;
        self
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Rc::new(sink);
        self
    }

    pub fn build(self) -> PostRequestController<C> {
        let inner = Rc::new(Inner {
            client: Rc::new(self.client),
            config: self.config,
            sink: self.sink,
            spawner: self.spawner,
            target: RefCell::new(TargetRef::new(self.initial)),
            watch: RefCell::new(TargetWatch::new()),
            status: RefCell::new(RequestStatus::default()),
            listeners: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            notifying: Cell::new(false),
        });

        inner.run_effect();
        PostRequestController { inner }
    }
}
