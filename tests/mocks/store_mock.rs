use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use review_widget::error::{RealtimeError, StoreError};
use review_widget::models::review::{NewReview, Review, RowId};
use review_widget::realtime::{InsertCallback, RealtimeFeed, Subscription};
use review_widget::store::ReviewStore;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn row(id: i64, post_id: &str, text: &str, minutes: i64) -> Review {
    Review {
        id: Some(RowId::Int(id)),
        post_id: post_id.to_string(),
        text: text.to_string(),
        created_at: Some(base_time() + Duration::minutes(minutes)),
    }
}

#[derive(Default)]
struct StoreState {
    rows: RefCell<Vec<Review>>,
    inserts: RefCell<Vec<NewReview>>,
    fetches: Cell<usize>,
    fail_fetch: Cell<bool>,
    fail_insert: Cell<bool>,
    next_id: Cell<i64>,
}

/// In-memory review table. Clones share the same table.
#[derive(Clone, Default)]
pub struct MockStore {
    state: Rc<StoreState>,
}

impl MockStore {
    pub fn with_rows(rows: Vec<Review>) -> Self {
        let store = Self::default();
        let max_id = rows
            .iter()
            .filter_map(|row| match row.id {
                Some(RowId::Int(id)) => Some(id),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        store.state.next_id.set(max_id);
        *store.state.rows.borrow_mut() = rows;
        store
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.state.fail_fetch.set(fail);
    }

    pub fn fail_insert(&self, fail: bool) {
        self.state.fail_insert.set(fail);
    }

    pub fn inserts(&self) -> Vec<NewReview> {
        self.state.inserts.borrow().clone()
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.get()
    }
}

#[async_trait(?Send)]
impl ReviewStore for MockStore {
    async fn fetch_reviews(&self, post_id: &str) -> Result<Vec<Review>, StoreError> {
        self.state.fetches.set(self.state.fetches.get() + 1);
        if self.state.fail_fetch.get() {
            return Err(StoreError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let mut rows: Vec<Review> = self
            .state
            .rows
            .borrow()
            .iter()
            .filter(|row| row.post_id == post_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, StoreError> {
        self.state.inserts.borrow_mut().push(review.clone());
        if self.state.fail_insert.get() {
            return Err(StoreError::Network("connection reset".to_string()));
        }
        let id = self.state.next_id.get() + 1;
        self.state.next_id.set(id);
        let stored = row(id, &review.post_id, &review.text, 60 + id);
        self.state.rows.borrow_mut().push(stored.clone());
        Ok(stored)
    }
}

struct Listener {
    key: u64,
    post_id: String,
    on_insert: InsertCallback,
}

#[derive(Default)]
struct FeedState {
    listeners: RefCell<Vec<Listener>>,
    subscribe_calls: Cell<usize>,
    next_key: Cell<u64>,
    fail: Cell<bool>,
}

/// Realtime feed whose pushes are triggered by the test.
#[derive(Clone, Default)]
pub struct MockFeed {
    state: Rc<FeedState>,
}

impl MockFeed {
    pub fn fail(&self, fail: bool) {
        self.state.fail.set(fail);
    }

    /// Push `review` to every listener of its scope.
    pub fn emit(&self, review: &Review) {
        let callbacks: Vec<InsertCallback> = self
            .state
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.post_id == review.post_id)
            .map(|listener| listener.on_insert.clone())
            .collect();
        for callback in callbacks {
            callback(review.clone());
        }
    }

    pub fn active(&self) -> usize {
        self.state.listeners.borrow().len()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.state.subscribe_calls.get()
    }
}

#[async_trait(?Send)]
impl RealtimeFeed for MockFeed {
    async fn subscribe(
        &self,
        post_id: &str,
        on_insert: InsertCallback,
    ) -> Result<Subscription, RealtimeError> {
        self.state.subscribe_calls.set(self.state.subscribe_calls.get() + 1);
        if self.state.fail.get() {
            return Err(RealtimeError::Connect("refused".to_string()));
        }
        let key = self.state.next_key.get() + 1;
        self.state.next_key.set(key);
        self.state.listeners.borrow_mut().push(Listener {
            key,
            post_id: post_id.to_string(),
            on_insert,
        });

        let state = self.state.clone();
        Ok(Subscription::new(format!("realtime:reviews-insert-{post_id}"), move || {
            state.listeners.borrow_mut().retain(|listener| listener.key != key);
        }))
    }
}
