use leptos::*;
use leptos::ev::SubmitEvent;

#[component]
pub fn ReviewForm(draft: RwSignal<String>, on_submit: Callback<String>) -> impl IntoView {
    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        on_submit.call(draft.get_untracked());
    };

    view! {
        <form class="review-form" on:submit=handle_submit>
            <textarea
                placeholder="Write your comment here"
                prop:value=move || draft.get()
                on:input=move |e| draft.set(event_target_value(&e))
            />
            <button type="submit">{ "Submit" }</button>
        </form>
    }
}
