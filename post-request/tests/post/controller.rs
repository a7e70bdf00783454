use post_request::{
    PostPhase, PostRequestController, RequestConfig, RequestStatus,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use test_helpers::mock::{MOCK_FAILURE, MockClient, RecordingSink};
use test_helpers::{local_spawner, settle};
use tokio::task::LocalSet;

use crate::mount;

/// Collects every status the controller publishes.
fn record_transitions(
    controller: &PostRequestController<MockClient>,
) -> Rc<RefCell<Vec<RequestStatus>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    controller.subscribe(move |status| sink.borrow_mut().push(status.clone()));
    seen
}

#[tokio::test]
async fn fresh_controller_is_idle() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::manual();
            let controller = mount(&client, &RecordingSink::default());

            assert_eq!(controller.status(), RequestStatus::default());
            assert_eq!(controller.status().phase(), PostPhase::Idle);

            settle().await;
            assert_eq!(client.call_count(), 0);
        })
        .await;
}

#[tokio::test]
async fn falsy_body_never_fires() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"ok": true}));
            let controller = mount(&client, &RecordingSink::default());
            let seen = record_transitions(&controller);

            for body in [json!(null), json!(false), json!(0), json!("")] {
                controller.trigger("https://x/y", body);
            }
            settle().await;

            assert_eq!(client.call_count(), 0);
            assert!(seen.borrow().is_empty());
            assert_eq!(controller.status(), RequestStatus::default());
        })
        .await;
}

#[tokio::test]
async fn falsy_body_keeps_previous_outcome() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"ok": true}));
            let controller = mount(&client, &RecordingSink::default());

            controller.trigger("https://x/y", json!({"a": 1}));
            settle().await;
            let succeeded = controller.status();
            assert_eq!(succeeded.phase(), PostPhase::Succeeded);

            controller.trigger("https://x/y", json!(""));
            settle().await;

            assert_eq!(controller.status(), succeeded);
            assert_eq!(client.call_count(), 1);
        })
        .await;
}

#[tokio::test]
async fn empty_url_never_fires() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"ok": true}));
            let controller = mount(&client, &RecordingSink::default());

            controller.trigger("", json!({"a": 1}));
            settle().await;

            assert_eq!(client.call_count(), 0);
            assert_eq!(controller.status(), RequestStatus::default());
        })
        .await;
}

#[tokio::test]
async fn happy_path_goes_uploading_then_success() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::manual();
            let controller = mount(&client, &RecordingSink::default());
            let seen = record_transitions(&controller);

            controller.trigger("https://x/y", json!({"a": 1}));
            assert!(controller.status().uploading);
            assert!(!controller.status().error);

            settle().await;
            let calls = client.calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].url, "https://x/y");
            assert_eq!(calls[0].body, json!({"a": 1}));

            client.resolve(0, json!({"ok": true}));
            settle().await;

            assert_eq!(
                *seen.borrow(),
                vec![
                    RequestStatus {
                        response: None,
                        uploading: true,
                        error: false,
                    },
                    RequestStatus {
                        response: Some(json!({"ok": true})),
                        uploading: false,
                        error: false,
                    },
                ]
            );
            assert_eq!(controller.status().phase(), PostPhase::Succeeded);
        })
        .await;
}

#[tokio::test]
async fn failure_clears_response_and_reports() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::manual();
            let sink = RecordingSink::default();
            let controller = mount(&client, &sink);

            controller.trigger("https://x/y", json!({"a": 1}));
            settle().await;
            client.resolve(0, json!({"ok": true}));
            settle().await;
            assert!(controller.status().response.is_some());

            controller.trigger("https://x/y", json!({"a": 2}));
            // The stale response stays visible while uploading
            assert_eq!(
                controller.status().response,
                Some(json!({"ok": true}))
            );
            settle().await;
            client.fail(1);
            settle().await;

            assert_eq!(
                controller.status(),
                RequestStatus {
                    response: None,
                    uploading: false,
                    error: true,
                }
            );

            let reports = sink.reports();
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].url.as_deref(), Some("https://x/y"));
            assert_eq!(reports[0].message, MOCK_FAILURE);
        })
        .await;
}

#[tokio::test]
async fn equal_values_still_fire_twice() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"ok": true}));
            let controller = mount(&client, &RecordingSink::default());

            controller.trigger(String::from("https://x/y"), json!({"a": 1}));
            controller.trigger(String::from("https://x/y"), json!({"a": 1}));
            settle().await;

            let calls = client.calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[0], calls[1]);
            assert_eq!(controller.status().response, Some(json!({"ok": true})));
        })
        .await;
}

#[tokio::test]
async fn status_reads_are_stable() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::manual();
            let controller = mount(&client, &RecordingSink::default());

            controller.trigger("https://x/y", json!([1]));
            assert_eq!(controller.status(), controller.status());

            settle().await;
            let before = controller.status();
            settle().await;
            assert_eq!(controller.status(), before);

            client.resolve(0, json!("done"));
            settle().await;
            let after = controller.status();
            assert_eq!(controller.status(), after);
            assert_ne!(before, after);
        })
        .await;
}

#[tokio::test]
async fn initial_target_fires_on_mount() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"created": 1}));
            let controller =
                PostRequestController::builder(client.clone(), local_spawner())
                    .initial_target(
                        Some("https://x/items".into()),
                        json!({"name": "first"}),
                    )
                    .diagnostics(RecordingSink::default())
                    .build();

            assert!(controller.status().uploading);
            assert_eq!(controller.target().body, json!({"name": "first"}));

            settle().await;
            assert_eq!(client.call_count(), 1);
            assert_eq!(controller.status().response, Some(json!({"created": 1})));
        })
        .await;
}

#[tokio::test]
async fn initial_target_without_url_waits_for_trigger() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"ok": true}));
            let controller =
                PostRequestController::builder(client.clone(), local_spawner())
                    .initial_target(None, json!({"name": "first"}))
                    .diagnostics(RecordingSink::default())
                    .build();

            settle().await;
            assert_eq!(client.call_count(), 0);
            assert_eq!(controller.status(), RequestStatus::default());
        })
        .await;
}

#[tokio::test]
async fn config_is_passed_through() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"ok": true}));
            let config = RequestConfig::default().with_header("x-trace", "42");
            let controller =
                PostRequestController::builder(client.clone(), local_spawner())
                    .config(config.clone())
                    .diagnostics(RecordingSink::default())
                    .build();

            controller.trigger("https://x/y", json!({"a": 1}));
            settle().await;

            assert_eq!(client.calls()[0].config, config);
        })
        .await;
}

#[tokio::test]
async fn listeners_may_trigger_again() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::succeeding(json!({"ok": true}));
            let controller =
                Rc::new(mount(&client, &RecordingSink::default()));

            let weak = Rc::downgrade(&controller);
            let followed_up = Rc::new(Cell::new(false));
            let flag = followed_up.clone();
            controller.subscribe(move |status| {
                if status.response.is_some() && !flag.get() {
                    flag.set(true);
                    if let Some(controller) = weak.upgrade() {
                        controller.trigger("https://x/next", json!({"b": 2}));
                    }
                }
            });

            controller.trigger("https://x/first", json!({"a": 1}));
            settle().await;

            let urls: Vec<_> =
                client.calls().into_iter().map(|call| call.url).collect();
            assert_eq!(urls, vec!["https://x/first", "https://x/next"]);
            assert!(followed_up.get());
            assert_eq!(controller.status().phase(), PostPhase::Succeeded);
        })
        .await;
}

#[tokio::test]
async fn later_listeners_end_on_the_current_status() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::manual();
            let controller =
                Rc::new(mount(&client, &RecordingSink::default()));

            let weak = Rc::downgrade(&controller);
            let followed_up = Rc::new(Cell::new(false));
            let flag = followed_up.clone();
            controller.subscribe(move |status| {
                if status.response.is_some() && !flag.get() {
                    flag.set(true);
                    if let Some(controller) = weak.upgrade() {
                        controller.trigger("https://x/next", json!({"b": 2}));
                    }
                }
            });
            let seen = record_transitions(&controller);

            controller.trigger("https://x/first", json!({"a": 1}));
            settle().await;
            client.resolve(0, json!({"ok": true}));
            settle().await;

            assert!(followed_up.get());
            let current = controller.status();
            assert_eq!(current.phase(), PostPhase::Uploading);
            assert_eq!(current.response, Some(json!({"ok": true})));

            let phases: Vec<_> =
                seen.borrow().iter().map(RequestStatus::phase).collect();
            assert_eq!(
                phases,
                vec![
                    PostPhase::Uploading,
                    PostPhase::Succeeded,
                    PostPhase::Uploading,
                ]
            );
            assert_eq!(seen.borrow().last(), Some(&current));
        })
        .await;
}

#[tokio::test]
async fn listeners_may_subscribe() {
    LocalSet::new()
        .run_until(async {
            let client = MockClient::manual();
            let controller =
                Rc::new(mount(&client, &RecordingSink::default()));

            let weak = Rc::downgrade(&controller);
            let late = Rc::new(RefCell::new(Vec::new()));
            let late_sink = late.clone();
            let subscribed = Rc::new(Cell::new(false));
            controller.subscribe(move |_| {
                if subscribed.replace(true) {
                    return;
                }
                let Some(controller) = weak.upgrade() else {
                    return;
                };
                let sink = late_sink.clone();
                controller.subscribe(move |status: &RequestStatus| {
                    sink.borrow_mut().push(status.phase());
                });
            });

            controller.trigger("https://x/first", json!({"a": 1}));
            settle().await;
            client.resolve(0, json!({"ok": true}));
            settle().await;

            assert_eq!(*late.borrow(), vec![PostPhase::Succeeded]);
        })
        .await;
}
