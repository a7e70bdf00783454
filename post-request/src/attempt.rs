use futures::FutureExt;
use std::rc::Rc;

use crate::{
    CancelFlag, DiagnosticSink, PostAction, PostClient, RequestTarget,
    Spawner, TargetRef,
};

/// Perform one POST for `target` and map the outcome onto a transition.
///
/// Failures never escape: the error goes to `sink` and the result is
/// `UploadError`. Callers drop the returned action when the attempt has
/// been superseded.
pub async fn post_attempt<C: PostClient>(
    client: &C,
    target: &RequestTarget,
    config: &C::Config,
    sink: &dyn DiagnosticSink,
) -> PostAction {
    let url = target.url.as_deref().unwrap_or_default();

    match client.post(url, &target.body, config).await {
        Ok(response) => PostAction::UploadSuccess(response),
        Err(e) => {
            sink.report(target, &e);
            PostAction::UploadError
        }
    }
}

/// Start the attempt for a newly observed `target`.
///
/// Ineligible targets only log. Otherwise `UploadInit` is dispatched right
/// away and the attempt is spawned; its result is dispatched unless
/// `cancel` was set in the meantime.
pub fn start_attempt<C: PostClient + 'static>(
    target: TargetRef,
    cancel: CancelFlag,
    client: Rc<C>,
    config: C::Config,
    sink: Rc<dyn DiagnosticSink>,
    spawner: &dyn Spawner,
    dispatch: impl Fn(PostAction) + 'static,
) {
    if !target.is_fire_eligible() {
        tracing::debug!("POST target is not fire-eligible, skipping");
        return;
    }

    dispatch(PostAction::UploadInit);

    let task = async move {
        let action = post_attempt(&*client, &target, &config, &*sink).await;

        if cancel.is_cancelled() {
            tracing::debug!(
                url = target.url.as_deref(),
                "Discarding result of superseded POST"
            );
            return;
        }
        dispatch(action);
    };

    spawner.spawn_local(task.boxed_local());
}
