//! Push feed of newly inserted review rows.

pub mod protocol;
mod socket;

use async_trait::async_trait;
use std::fmt;
use std::rc::Rc;

use crate::error::RealtimeError;
use crate::models::review::Review;

pub use socket::SupabaseRealtime;

/// Called once per pushed row.
pub type InsertCallback = Rc<dyn Fn(Review)>;

#[async_trait(?Send)]
pub trait RealtimeFeed {
    /// Start delivering inserts for `post_id` to `on_insert` until the
    /// returned handle is unsubscribed or dropped.
    async fn subscribe(
        &self,
        post_id: &str,
        on_insert: InsertCallback,
    ) -> Result<Subscription, RealtimeError>;
}

/// Live subscription. Dropping it unsubscribes.
pub struct Subscription {
    topic: String,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(topic: impl Into<String>, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            topic: topic.into(),
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
