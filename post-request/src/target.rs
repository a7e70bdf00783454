use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

/// The (url, body) pair that should currently be POSTed.
///
/// Targets are replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestTarget {
    pub url: Option<String>,
    pub body: Value,
}

impl RequestTarget {
    pub fn new(url: Option<String>, body: Value) -> Self {
        Self { url, body }
    }

    /// A target fires only when both url and body are truthy.
    ///
    /// A falsy body (`null`, `false`, `0`, `""`) suppresses the POST even
    /// when a url is present, so such bodies can never be sent.
    pub fn is_fire_eligible(&self) -> bool {
        let has_url = self.url.as_deref().is_some_and(|url| !url.is_empty());
        has_url && is_truthy(&self.body)
    }
}

/// JavaScript-style truthiness for JSON values.
///
/// Arrays and objects are always truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A shared target compared by identity rather than by contents.
///
/// Two targets built from equal values are still different targets, so
/// replacing a target with an identical copy fires a new attempt.
#[derive(Debug, Clone)]
pub struct TargetRef(Rc<RequestTarget>);

impl TargetRef {
    pub fn new(target: RequestTarget) -> Self {
        Self(Rc::new(target))
    }
}

impl From<RequestTarget> for TargetRef {
    fn from(target: RequestTarget) -> Self {
        Self::new(target)
    }
}

impl Default for TargetRef {
    fn default() -> Self {
        Self::new(RequestTarget::default())
    }
}

impl PartialEq for TargetRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for TargetRef {
    type Target = RequestTarget;

    fn deref(&self) -> &RequestTarget {
        &self.0
    }
}

/// Set when a newer target supersedes the attempt holding this flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Rc<Cell<bool>>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Tracks the last observed target and the cleanup for its attempt.
///
/// This is the effect half of the controller: it re-runs only when the
/// target identity changes, and always cancels the previous attempt before
/// handing out a flag for the next one.
#[derive(Debug, Default)]
pub struct TargetWatch {
    last_seen: Option<TargetRef>,
    live: Option<CancelFlag>,
}

impl TargetWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh flag if `target` is a new identity, or `None` if the
    /// effect should not re-run.
    pub fn observe(&mut self, target: &TargetRef) -> Option<CancelFlag> {
        if self.last_seen.as_ref() == Some(target) {
            return None;
        }

        self.cleanup();
        self.last_seen = Some(target.clone());

        let flag = CancelFlag::new();
        self.live = Some(flag.clone());
        Some(flag)
    }

    /// Cancel the live attempt, if any. Also used on teardown.
    pub fn cleanup(&mut self) {
        if let Some(flag) = self.live.take() {
            flag.cancel();
        }
    }
}
