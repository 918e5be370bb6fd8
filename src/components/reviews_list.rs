use leptos::*;
use crate::components::review_section::SignalContainer;

/// Review blocks of one section, newest first, followed by the status line
/// (loading or failure) when there is one.
#[component]
pub fn ReviewsList(container: SignalContainer) -> impl IntoView {
    view! {
        <div class="reviews-display">
            {move || {
                container.reviews.get().into_iter().map(|review| {
                    view! {
                        <div class="review-item">
                            <p>{ review.text }</p>
                            <p class="review-date">{ review.timestamp }</p>
                        </div>
                    }
                }).collect_view()
            }}
            {move || container.notice.get().map(|message| view! { <p>{ message }</p> })}
        </div>
    }
}
