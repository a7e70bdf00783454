use post_request::{PostPhase, RequestStatus};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PostStatusProps {
    pub status: RequestStatus,
}

/// Shows where the latest POST stands, and its response once it succeeded.
#[function_component]
pub fn PostStatusView(props: &PostStatusProps) -> Html {
    let status = &props.status;

    let badge_class = match status.phase() {
        PostPhase::Idle => "bg-neutral-100 text-neutral-700",
        PostPhase::Uploading => "bg-blue-100 text-blue-700",
        PostPhase::Succeeded => "bg-green-100 text-green-700",
        PostPhase::Failed => "bg-red-100 text-red-700",
    };

    let response = status
        .response
        .as_ref()
        .map(|response| {
            serde_json::to_string_pretty(response)
                .unwrap_or_else(|_| response.to_string())
        });

    html! {
        <div class="space-y-2">
            <span class={classes!("px-2", "py-1", "rounded", "text-sm", badge_class)}>
                {status.phase().to_string()}
            </span>
            if status.error {
                <p class="text-sm text-red-700 dark:text-red-400">
                    {"The request failed. Check the console for details."}
                </p>
            }
            if let Some(response) = response {
                <pre class="p-3 rounded bg-neutral-50 dark:bg-neutral-800 text-sm overflow-x-auto">
                    {response}
                </pre>
            }
        </div>
    }
}
