mod controller;

use post_request::PostRequestController;
use test_helpers::local_spawner;
use test_helpers::mock::{MockClient, RecordingSink};

/// Mount a controller over `client` that reports into `sink`.
pub fn mount(
    client: &MockClient,
    sink: &RecordingSink,
) -> PostRequestController<MockClient> {
    PostRequestController::builder(client.clone(), local_spawner())
        .diagnostics(sink.clone())
        .build()
}
