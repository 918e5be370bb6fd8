use leptos::*;
use leptos::logging::warn;
use std::rc::Rc;

use crate::components::{review_form::ReviewForm, reviews_list::ReviewsList};
use crate::config::WidgetConfig;
use crate::dom::WindowAlert;
use crate::models::review::RenderedReview;
use crate::realtime::Subscription;
use crate::surface::{ReviewContainer, ReviewInput, UNAVAILABLE_MESSAGE};
use crate::widget::SupabaseWidget;

/// Container state kept in signals, so a section can be rendered by Leptos.
#[derive(Clone, Copy)]
pub struct SignalContainer {
    pub notice: RwSignal<Option<String>>,
    pub reviews: RwSignal<Vec<RenderedReview>>,
}

impl SignalContainer {
    pub fn new() -> Self {
        Self {
            notice: create_rw_signal(None),
            reviews: create_rw_signal(Vec::new()),
        }
    }
}

impl Default for SignalContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewContainer for SignalContainer {
    fn show_message(&self, message: &str) {
        self.reviews.set(Vec::new());
        self.notice.set(Some(message.to_string()));
    }

    fn clear(&self) {
        self.reviews.set(Vec::new());
        self.notice.set(None);
    }

    fn prepend(&self, review: &RenderedReview) {
        let review = review.clone();
        self.reviews.update(|reviews| reviews.insert(0, review));
    }
}

/// Draft text of a section's form.
#[derive(Clone, Copy)]
pub struct SignalInput(pub RwSignal<String>);

impl ReviewInput for SignalInput {
    fn value(&self) -> String {
        self.0.get_untracked()
    }

    fn clear(&self) {
        self.0.set(String::new());
    }
}

/// One comment section. Loads and subscribes once mounted in the browser,
/// and closes its realtime channel when unmounted.
#[component]
pub fn ReviewSection(
    #[prop(into)] post_id: String,
    #[prop(optional, into)] heading: Option<String>,
    #[prop(default = true)] with_form: bool,
) -> impl IntoView {
    let container = SignalContainer::new();
    let draft = create_rw_signal(String::new());
    let subscription = store_value(None::<Subscription>);

    let widget = use_context::<WidgetConfig>()
        .map(|config| Rc::new(SupabaseWidget::connect(config, Box::new(WindowAlert))));
    let thread = widget
        .as_ref()
        .map(|widget| Rc::new(widget.thread(post_id.clone(), container)));

    match (widget.clone(), thread.clone()) {
        (Some(widget), Some(thread)) => {
            // Effects only run in the browser, after hydration.
            create_effect(move |_| {
                let loader = widget.clone();
                let loaded = thread.clone();
                spawn_local(async move {
                    let _ = loader.load(&loaded).await;
                });

                let widget = widget.clone();
                let thread = thread.clone();
                spawn_local(async move {
                    if let Some(handle) = widget.subscribe_realtime(thread).await {
                        // Dropped, and so closed, if the section is already gone.
                        let _ = subscription.try_update_value(move |slot| *slot = Some(handle));
                    }
                });
            });
        }
        _ => {
            warn!("[REVIEWS] No widget configuration in context for section {}", post_id);
            container.show_message(UNAVAILABLE_MESSAGE);
        }
    }

    on_cleanup(move || {
        let _ = subscription.try_update_value(|slot| {
            if let Some(handle) = slot.take() {
                handle.unsubscribe();
            }
        });
    });

    let on_submit = Callback::new(move |text: String| {
        let (Some(widget), Some(thread)) = (widget.clone(), thread.clone()) else {
            return;
        };
        spawn_local(async move {
            let _ = widget.submit(&thread, &text, &SignalInput(draft)).await;
        });
    });

    view! {
        <section class="review-section" data-post-id=post_id>
            {heading.map(|heading| view! { <h3>{ heading }</h3> })}
            {with_form.then(|| view! { <ReviewForm draft=draft on_submit=on_submit /> })}
            <ReviewsList container=container />
        </section>
    }
}
