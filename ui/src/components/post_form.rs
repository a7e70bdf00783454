use post_request::Value;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::PostStatusView;
use crate::hooks::{UsePostOptions, use_post};

#[derive(Properties, PartialEq)]
pub struct PostFormProps {
    #[prop_or(AttrValue::from("/api/echo"))]
    pub default_url: AttrValue,
}

/// Form for sending an arbitrary POST and watching its status.
///
/// The body is sent as JSON when it parses as JSON, and as a JSON string
/// otherwise. An empty body is never sent.
#[function_component]
pub fn PostForm(props: &PostFormProps) -> Html {
    let post = use_post(UsePostOptions::default(), Value::Null);

    let url_ref = use_node_ref();
    let body_ref = use_node_ref();

    let on_submit = {
        let url_ref = url_ref.clone();
        let body_ref = body_ref.clone();
        let do_post = post.do_post.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let (Some(url_input), Some(body_input)) = (
                url_ref.cast::<HtmlInputElement>(),
                body_ref.cast::<HtmlTextAreaElement>(),
            ) else {
                return;
            };

            do_post.emit((url_input.value(), parse_body(&body_input.value())));
        })
    };

    html! {
        <form onsubmit={on_submit} class="space-y-4 max-w-xl">
            <div>
                <label for="post-url" class="block text-sm font-medium">{"URL"}</label>
                <input
                    ref={url_ref}
                    id="post-url"
                    type="text"
                    value={props.default_url.clone()}
                    class="w-full px-3 py-2 border rounded-md"
                />
            </div>
            <div>
                <label for="post-body" class="block text-sm font-medium">{"Body"}</label>
                <textarea
                    ref={body_ref}
                    id="post-body"
                    rows="6"
                    placeholder={"{\"message\": \"hello\"}"}
                    class="w-full px-3 py-2 border rounded-md font-mono text-sm"
                />
            </div>
            <button
                type="submit"
                disabled={post.uploading()}
                class="px-4 py-2 rounded-md bg-neutral-900 text-white disabled:opacity-50"
            >
                {if post.uploading() { "Sending..." } else { "Send" }}
            </button>
            <PostStatusView status={post.status.clone()} />
        </form>
    }
}

/// JSON if the input parses as JSON, otherwise the raw text as a string.
fn parse_body(input: &str) -> Value {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed)
        .unwrap_or_else(|_| Value::String(input.to_string()))
}
