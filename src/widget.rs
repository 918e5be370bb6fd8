//! The review widget: load, submit, render and live-update one section.

use leptos::logging::{error, log, warn};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::config::WidgetConfig;
use crate::error::ReviewError;
use crate::models::review::{NewReview, RenderedReview, Review, RowId};
use crate::realtime::{InsertCallback, RealtimeFeed, SupabaseRealtime, Subscription};
use crate::store::{RestStore, ReviewStore};
use crate::surface::{
    Notifier, ReviewContainer, ReviewInput, LOADING_MESSAGE, LOAD_FAILED_MESSAGE,
    SUBMIT_FAILED_MESSAGE,
};

/// Static switches of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetOptions {
    pub enable_realtime: bool,
    pub dedupe: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            enable_realtime: true,
            dedupe: true,
        }
    }
}

impl From<&WidgetConfig> for WidgetOptions {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            enable_realtime: config.enable_realtime,
            dedupe: config.dedupe_realtime,
        }
    }
}

/// Prepend one review block to `container`.
pub fn render<C: ReviewContainer + ?Sized>(review: &Review, container: &C) {
    container.prepend(&RenderedReview::from_review(review));
}

/// One comment section: a scope key bound to the container showing it.
///
/// Remembers which row ids it has rendered so a realtime echo of a row the
/// section already shows can be skipped.
pub struct ReviewThread<C> {
    post_id: String,
    container: C,
    dedupe: bool,
    seen: RefCell<HashSet<RowId>>,
}

impl<C: ReviewContainer> ReviewThread<C> {
    pub fn new(post_id: impl Into<String>, container: C, dedupe: bool) -> Self {
        Self {
            post_id: post_id.into(),
            container,
            dedupe,
            seen: RefCell::new(HashSet::new()),
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Render `review` unless deduplication is on and its id is already shown.
    /// Returns whether a block was added.
    pub fn render(&self, review: &Review) -> bool {
        if self.dedupe {
            if let Some(id) = &review.id {
                if !self.seen.borrow_mut().insert(id.clone()) {
                    log!("[REVIEWS] Skipping duplicate row {} in {}", id, self.post_id);
                    return false;
                }
            }
        }
        render(review, &self.container);
        true
    }

    fn reset(&self) {
        self.seen.borrow_mut().clear();
        self.container.clear();
    }
}

/// Drives sections against an injected store and realtime feed.
pub struct ReviewWidget<S, R> {
    store: S,
    realtime: R,
    notifier: Box<dyn Notifier>,
    options: WidgetOptions,
}

/// The production widget, talking to Supabase.
pub type SupabaseWidget = ReviewWidget<RestStore, SupabaseRealtime>;

impl SupabaseWidget {
    pub fn connect(config: WidgetConfig, notifier: Box<dyn Notifier>) -> Self {
        let options = WidgetOptions::from(&config);
        let config = Rc::new(config);
        ReviewWidget::new(
            RestStore::new(config.clone()),
            SupabaseRealtime::new(config),
            notifier,
            options,
        )
    }
}

impl<S: ReviewStore, R: RealtimeFeed> ReviewWidget<S, R> {
    pub fn new(store: S, realtime: R, notifier: Box<dyn Notifier>, options: WidgetOptions) -> Self {
        Self {
            store,
            realtime,
            notifier,
            options,
        }
    }

    pub fn options(&self) -> WidgetOptions {
        self.options
    }

    /// A section for `post_id` with this widget's dedupe setting.
    pub fn thread<C: ReviewContainer>(&self, post_id: impl Into<String>, container: C) -> ReviewThread<C> {
        ReviewThread::new(post_id, container, self.options.dedupe)
    }

    /// Replace the section's content with every stored review, newest on top.
    ///
    /// Returns the number of rows received.
    pub async fn load<C: ReviewContainer>(&self, thread: &ReviewThread<C>) -> Result<usize, ReviewError> {
        let container = thread.container();
        container.show_message(LOADING_MESSAGE);

        match self.store.fetch_reviews(thread.post_id()).await {
            Ok(rows) => {
                thread.reset();
                // Rows arrive newest first and every render prepends.
                for row in rows.iter().rev() {
                    thread.render(row);
                }
                log!("[REVIEWS] Loaded {} reviews for {}", rows.len(), thread.post_id());
                Ok(rows.len())
            }
            Err(source) => {
                error!("[REVIEWS] Load error for {}: {:?}", thread.post_id(), source);
                container.show_message(LOAD_FAILED_MESSAGE);
                Err(ReviewError::Load {
                    post_id: thread.post_id().to_string(),
                    source,
                })
            }
        }
    }

    /// Store the trimmed text and show the stored row.
    ///
    /// Blank input is ignored (`Ok(None)`). On failure the reader is alerted
    /// and `input` keeps its text so they can retry.
    pub async fn submit<C, I>(
        &self,
        thread: &ReviewThread<C>,
        raw_text: &str,
        input: &I,
    ) -> Result<Option<Review>, ReviewError>
    where
        C: ReviewContainer,
        I: ReviewInput + ?Sized,
    {
        let Some(review) = NewReview::from_input(thread.post_id(), raw_text) else {
            return Ok(None);
        };

        match self.store.insert_review(&review).await {
            Ok(stored) => {
                thread.render(&stored);
                input.clear();
                Ok(Some(stored))
            }
            Err(source) => {
                error!("[REVIEWS] Insert error for {}: {:?}", thread.post_id(), source);
                self.notifier.alert(SUBMIT_FAILED_MESSAGE);
                Err(ReviewError::Submit {
                    post_id: thread.post_id().to_string(),
                    source,
                })
            }
        }
    }

    /// Render future inserts for the section as they are pushed.
    ///
    /// `None` when realtime is switched off or the channel could not be opened.
    pub async fn subscribe_realtime<C>(&self, thread: Rc<ReviewThread<C>>) -> Option<Subscription>
    where
        C: ReviewContainer + 'static,
    {
        if !self.options.enable_realtime {
            return None;
        }

        let post_id = thread.post_id().to_string();
        let on_insert: InsertCallback = Rc::new(move |review: Review| {
            thread.render(&review);
        });

        match self.realtime.subscribe(&post_id, on_insert).await {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                warn!("[REVIEWS] Realtime unavailable for {}: {}", post_id, err);
                None
            }
        }
    }
}
