use post_request::ReqwestPostClient;
use yew::prelude::*;

pub mod components;
pub mod hooks;
mod logs;

use components::PostForm;

// Post client - configurable via environment or same-origin fallback
pub fn get_post_client() -> ReqwestPostClient {
    // Try environment variable first (set at build time)
    let address = option_env!("BACKEND_URL")
        .map(|url| url.to_string())
        .or_else(|| {
            // Fallback to same origin
            web_sys::window().and_then(|window| window.location().origin().ok())
        });

    ReqwestPostClient::new(address)
}

#[function_component]
pub fn App() -> Html {
    use_effect_with((), |_| logs::init_logging());

    html! {
        <div class="min-h-screen bg-white dark:bg-gray-900 text-gray-900 dark:text-gray-100 transition-colors">
            <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8 space-y-6">
                <h1 class="text-2xl font-bold">{"POST playground"}</h1>
                <PostForm />
            </main>
        </div>
    }
}
