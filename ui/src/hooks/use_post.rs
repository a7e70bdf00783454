use futures::future::LocalBoxFuture;
use post_request::{
    PostAction, RequestConfig, RequestStatus, RequestTarget, TargetRef,
    TargetWatch, TracingSink, Value, start_attempt,
};
use std::rc::Rc;
use yew::prelude::*;

/// [`RequestStatus`] as a Yew reducer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostState(pub RequestStatus);

impl Reducible for PostState {
    type Action = PostAction;

    fn reduce(self: Rc<Self>, action: PostAction) -> Rc<Self> {
        Rc::new(Self(self.0.reduce(action)))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsePostOptions {
    /// POSTed on mount together with the initial body, if both are truthy.
    pub initial_url: Option<String>,
    pub config: RequestConfig,
}

/// Post hook return type
pub struct UsePostHandle {
    pub status: RequestStatus,
    /// Replace the target with `(url, body)`, firing a new POST.
    pub do_post: Callback<(String, Value)>,
}

impl UsePostHandle {
    pub fn uploading(&self) -> bool {
        self.status.uploading
    }

    pub fn error(&self) -> bool {
        self.status.error
    }

    pub fn response(&self) -> Option<&Value> {
        self.status.response.as_ref()
    }
}

/// POST from a component and track the request's status.
///
/// Every call to `do_post` replaces the target, even with the same url and
/// body, and starts a new attempt once the component re-renders. Results
/// of attempts that were superseded before they settled are dropped, so
/// only the newest target's outcome reaches the status.
///
/// # Example
///
/// ```rust,ignore
/// #[function_component]
/// fn Feedback() -> Html {
///     let post = use_post(UsePostOptions::default(), Value::Null);
///
///     let onclick = {
///         let do_post = post.do_post.clone();
///         Callback::from(move |_| {
///             do_post.emit(("/api/feedback".into(), json!({"stars": 5})))
///         })
///     };
///
///     html! {
///         <button {onclick} disabled={post.uploading()}>{"Send"}</button>
///     }
/// }
/// ```
#[hook]
pub fn use_post(options: UsePostOptions, initial_body: Value) -> UsePostHandle {
    let target = use_state(|| {
        TargetRef::new(RequestTarget::new(
            options.initial_url.clone(),
            initial_body,
        ))
    });
    let state = use_reducer(PostState::default);

    let watch = use_mut_ref(TargetWatch::new);

    // Re-run whenever the target identity changes
    {
        let dispatcher = state.dispatcher();
        let config = options.config.clone();

        use_effect_with((*target).clone(), move |target: &TargetRef| {
            let cancel = watch.borrow_mut().observe(target);
            if let Some(cancel) = cancel {
                start_attempt(
                    target.clone(),
                    cancel,
                    Rc::new(crate::get_post_client()),
                    config,
                    Rc::new(TracingSink::for_build()),
                    &|task: LocalBoxFuture<'static, ()>| {
                        yew::platform::spawn_local(task)
                    },
                    move |action: PostAction| dispatcher.dispatch(action),
                );
            }

            move || watch.borrow_mut().cleanup()
        });
    }

    let do_post = {
        let target = target.clone();
        use_callback((), move |(url, body): (String, Value), _| {
            target.set(TargetRef::new(RequestTarget::new(Some(url), body)));
        })
    };

    UsePostHandle {
        status: state.0.clone(),
        do_post,
    }
}
