#![cfg(not(target_arch = "wasm32"))]

use std::rc::Rc;

use review_widget::error::{ReviewError, StoreError};
use review_widget::models::review::Review;
use review_widget::surface::{
    ReviewInput, LOADING_MESSAGE, LOAD_FAILED_MESSAGE, SUBMIT_FAILED_MESSAGE,
};
use review_widget::widget::{render, ReviewWidget, WidgetOptions};

mod mocks;
use mocks::store_mock::{row, MockFeed, MockStore};
use mocks::surface_mock::{MockContainer, MockInput, MockNotifier, Node};

struct Harness {
    widget: ReviewWidget<MockStore, MockFeed>,
    store: MockStore,
    feed: MockFeed,
    notifier: MockNotifier,
}

fn harness_with(rows: Vec<Review>, options: WidgetOptions) -> Harness {
    let store = MockStore::with_rows(rows);
    let feed = MockFeed::default();
    let notifier = MockNotifier::default();
    let widget = ReviewWidget::new(
        store.clone(),
        feed.clone(),
        Box::new(notifier.clone()),
        options,
    );
    Harness { widget, store, feed, notifier }
}

fn harness(rows: Vec<Review>) -> Harness {
    harness_with(rows, WidgetOptions::default())
}

#[test]
fn test_render_prepends_block() {
    let container = MockContainer::default();
    render(&row(1, "p1", "first", 0), &container);
    render(&row(2, "p1", "second", 1), &container);
    assert_eq!(container.texts(), vec!["second", "first"]);
}

#[test]
fn test_render_without_timestamp_uses_current_time() {
    let container = MockContainer::default();
    let review = Review {
        id: None,
        post_id: "p1".to_string(),
        text: "undated".to_string(),
        created_at: None,
    };
    render(&review, &container);
    match &container.nodes()[0] {
        Node::Review(block) => {
            assert_eq!(block.text, "undated");
            assert!(!block.timestamp.is_empty());
        }
        other => panic!("expected a review block, got {:?}", other),
    }
}

#[tokio::test]
async fn test_load_shows_newest_first() {
    let h = harness(vec![
        row(1, "p1", "nice", 0),
        row(2, "p1", "great post", 5),
        row(3, "p2", "elsewhere", 10),
    ]);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());

    let count = h.widget.load(&thread).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(container.texts(), vec!["great post", "nice"]);
    assert!(!container.nodes().contains(&Node::Message(LOADING_MESSAGE.to_string())));
}

#[tokio::test]
async fn test_load_preserves_received_order_for_many_rows() {
    let rows = (1..=6).map(|i| row(i, "p1", &format!("review {i}"), i)).collect();
    let h = harness(rows);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());

    h.widget.load(&thread).await.unwrap();

    let expected: Vec<String> = (1..=6).rev().map(|i| format!("review {i}")).collect();
    assert_eq!(container.texts(), expected);
}

#[tokio::test]
async fn test_load_empty_scope_leaves_container_empty() {
    let h = harness(vec![]);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());

    assert_eq!(h.widget.load(&thread).await.unwrap(), 0);
    assert!(container.nodes().is_empty());
}

#[tokio::test]
async fn test_load_failure_replaces_placeholder_with_message() {
    let h = harness(vec![row(1, "p1", "nice", 0)]);
    h.store.fail_fetch(true);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());

    let err = h.widget.load(&thread).await.unwrap_err();

    assert!(matches!(
        err,
        ReviewError::Load { ref post_id, source: StoreError::Status { status: 503, .. } } if post_id == "p1"
    ));
    assert_eq!(container.nodes(), vec![Node::Message(LOAD_FAILED_MESSAGE.to_string())]);
    assert_eq!(h.store.fetches(), 1);
    assert!(h.notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_reload_does_not_drop_rows_already_seen() {
    let h = harness(vec![row(1, "p1", "nice", 0), row(2, "p1", "great post", 5)]);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());

    h.widget.load(&thread).await.unwrap();
    h.widget.load(&thread).await.unwrap();

    assert_eq!(container.texts(), vec!["great post", "nice"]);
}

#[tokio::test]
async fn test_submit_trims_and_renders_on_top() {
    let h = harness(vec![row(1, "p1", "nice", 0)]);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());
    h.widget.load(&thread).await.unwrap();
    let input = MockInput::with_value("  hello  ");

    let stored = h.widget.submit(&thread, &input.value(), &input).await.unwrap();

    assert_eq!(stored.map(|review| review.text), Some("hello".to_string()));
    assert_eq!(h.store.inserts().len(), 1);
    assert_eq!(h.store.inserts()[0].text, "hello");
    assert_eq!(h.store.inserts()[0].post_id, "p1");
    assert_eq!(container.texts(), vec!["hello", "nice"]);
    assert_eq!(input.value(), "");
}

#[tokio::test]
async fn test_submit_blank_input_is_a_no_op() {
    let h = harness(vec![]);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());
    let input = MockInput::with_value("   ");

    let outcome = h.widget.submit(&thread, &input.value(), &input).await.unwrap();

    assert!(outcome.is_none());
    assert!(h.store.inserts().is_empty());
    assert!(container.nodes().is_empty());
    assert!(h.notifier.alerts().is_empty());
    assert_eq!(input.value(), "   ");
}

#[tokio::test]
async fn test_submit_failure_alerts_and_keeps_input() {
    let h = harness(vec![]);
    h.store.fail_insert(true);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());
    let input = MockInput::with_value("keep me");

    let err = h.widget.submit(&thread, &input.value(), &input).await.unwrap_err();

    assert!(matches!(err, ReviewError::Submit { ref post_id, .. } if post_id == "p1"));
    assert_eq!(h.notifier.alerts(), vec![SUBMIT_FAILED_MESSAGE.to_string()]);
    assert_eq!(input.value(), "keep me");
    assert!(container.nodes().is_empty());
}

#[tokio::test]
async fn test_rapid_double_submit_renders_both() {
    let h = harness(vec![]);
    let container = MockContainer::default();
    let thread = h.widget.thread("p1", container.clone());
    let input = MockInput::default();

    h.widget.submit(&thread, "same", &input).await.unwrap();
    h.widget.submit(&thread, "same", &input).await.unwrap();

    assert_eq!(h.store.inserts().len(), 2);
    assert_eq!(container.texts(), vec!["same", "same"]);
}

#[tokio::test]
async fn test_realtime_insert_renders_into_its_scope_only() {
    let h = harness(vec![]);
    let first = MockContainer::default();
    let second = MockContainer::default();
    let thread_a = Rc::new(h.widget.thread("p1", first.clone()));
    let thread_b = Rc::new(h.widget.thread("p2", second.clone()));

    let _sub_a = h.widget.subscribe_realtime(thread_a).await.unwrap();
    let _sub_b = h.widget.subscribe_realtime(thread_b).await.unwrap();
    h.feed.emit(&row(10, "p1", "live in p1", 0));

    assert_eq!(first.texts(), vec!["live in p1"]);
    assert!(second.nodes().is_empty());
}

#[tokio::test]
async fn test_submit_in_one_scope_never_reaches_another() {
    let h = harness(vec![]);
    let first = MockContainer::default();
    let second = MockContainer::default();
    let thread_a = Rc::new(h.widget.thread("p1", first.clone()));
    let thread_b = Rc::new(h.widget.thread("p2", second.clone()));
    let _sub_b = h.widget.subscribe_realtime(thread_b.clone()).await.unwrap();

    let stored = h
        .widget
        .submit(&thread_a, "only p1", &MockInput::default())
        .await
        .unwrap()
        .unwrap();
    h.feed.emit(&stored);
    h.widget.load(&thread_b).await.unwrap();

    assert_eq!(first.texts(), vec!["only p1"]);
    assert!(second.texts().is_empty());
}

#[tokio::test]
async fn test_realtime_echo_of_own_submission_renders_once() {
    let h = harness(vec![]);
    let container = MockContainer::default();
    let thread = Rc::new(h.widget.thread("p1", container.clone()));
    let _subscription = h.widget.subscribe_realtime(thread.clone()).await.unwrap();

    let stored = h
        .widget
        .submit(&thread, "hello", &MockInput::default())
        .await
        .unwrap()
        .unwrap();
    h.feed.emit(&stored);

    assert_eq!(container.texts(), vec!["hello"]);
}

#[tokio::test]
async fn test_realtime_echo_before_insert_response_renders_once() {
    let h = harness(vec![]);
    let container = MockContainer::default();
    let thread = Rc::new(h.widget.thread("p1", container.clone()));
    let _subscription = h.widget.subscribe_realtime(thread.clone()).await.unwrap();
    let input = MockInput::with_value("hello");

    // The store hands out id 1 to the next insert; its echo lands first.
    h.feed.emit(&row(1, "p1", "hello", 61));
    let stored = h.widget.submit(&thread, &input.value(), &input).await.unwrap();

    assert_eq!(stored.and_then(|review| review.id), row(1, "p1", "hello", 61).id);
    assert_eq!(container.texts(), vec!["hello"]);
    assert_eq!(input.value(), "");
    assert!(h.notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_realtime_echo_duplicates_when_dedupe_is_off() {
    let h = harness_with(
        vec![],
        WidgetOptions { enable_realtime: true, dedupe: false },
    );
    let container = MockContainer::default();
    let thread = Rc::new(h.widget.thread("p1", container.clone()));
    let _subscription = h.widget.subscribe_realtime(thread.clone()).await.unwrap();

    let stored = h
        .widget
        .submit(&thread, "hello", &MockInput::default())
        .await
        .unwrap()
        .unwrap();
    h.feed.emit(&stored);

    assert_eq!(container.texts(), vec!["hello", "hello"]);
}

#[tokio::test]
async fn test_rows_without_id_are_never_deduplicated() {
    let h = harness(vec![]);
    let container = MockContainer::default();
    let thread = Rc::new(h.widget.thread("p1", container.clone()));
    let _subscription = h.widget.subscribe_realtime(thread).await.unwrap();
    let mut anonymous = row(1, "p1", "no id", 0);
    anonymous.id = None;

    h.feed.emit(&anonymous);
    h.feed.emit(&anonymous);

    assert_eq!(container.texts(), vec!["no id", "no id"]);
}

#[tokio::test]
async fn test_realtime_disabled_never_contacts_feed() {
    let h = harness_with(
        vec![],
        WidgetOptions { enable_realtime: false, dedupe: true },
    );
    let thread = Rc::new(h.widget.thread("p1", MockContainer::default()));

    assert!(h.widget.subscribe_realtime(thread).await.is_none());
    assert_eq!(h.feed.subscribe_calls(), 0);
}

#[tokio::test]
async fn test_realtime_failure_is_contained() {
    let h = harness(vec![row(1, "p1", "nice", 0)]);
    h.feed.fail(true);
    let container = MockContainer::default();
    let thread = Rc::new(h.widget.thread("p1", container.clone()));

    assert!(h.widget.subscribe_realtime(thread.clone()).await.is_none());
    h.widget.load(&thread).await.unwrap();
    assert_eq!(container.texts(), vec!["nice"]);
}

#[tokio::test]
async fn test_unsubscribe_stops_rendering() {
    let h = harness(vec![]);
    let container = MockContainer::default();
    let thread = Rc::new(h.widget.thread("p1", container.clone()));
    let subscription = h.widget.subscribe_realtime(thread).await.unwrap();
    assert_eq!(subscription.topic(), "realtime:reviews-insert-p1");
    assert_eq!(h.feed.active(), 1);

    subscription.unsubscribe();
    h.feed.emit(&row(1, "p1", "too late", 0));

    assert_eq!(h.feed.active(), 0);
    assert!(container.nodes().is_empty());
}

#[tokio::test]
async fn test_dropping_subscription_unsubscribes() {
    let h = harness(vec![]);
    let thread = Rc::new(h.widget.thread("p1", MockContainer::default()));
    {
        let _subscription = h.widget.subscribe_realtime(thread).await.unwrap();
        assert_eq!(h.feed.active(), 1);
    }
    assert_eq!(h.feed.active(), 0);
}
