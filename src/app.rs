/// Page hosting the review sections: page-wide feedback plus one section per
/// configured post.
use leptos::*;
use leptos_meta::*;
use leptos_router::*;
use crate::components::review_section::ReviewSection;
use crate::config::{PostEntry, WidgetConfig, CONFIG_META_NAME};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // The server provides the config; the hydrated client reads it back from
    // the meta tag the server rendered.
    let config = use_context::<WidgetConfig>().or_else(config_from_page);
    if let Some(config) = config.clone() {
        provide_context(config);
    }

    view! {
        <Stylesheet id="leptos" href="/pkg/review-widget.css"/>
        <Title text="Reviews"/>
        {config.map(|config| view! { <Meta name=CONFIG_META_NAME content=config.to_json()/> })}
        <Router>
            <main>
                <Routes>
                    <Route path="" view=HomePage/>
                </Routes>
            </main>
        </Router>
    }
}

#[cfg(target_arch = "wasm32")]
fn config_from_page() -> Option<WidgetConfig> {
    let document = web_sys::window()?.document()?;
    match crate::dom::read_page_config(&document) {
        Ok(config) => Some(config),
        Err(err) => {
            leptos::logging::error!("[APP] {}", err);
            None
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn config_from_page() -> Option<WidgetConfig> {
    None
}

#[component]
fn HomePage() -> impl IntoView {
    let config = use_context::<WidgetConfig>();
    let global_post_id = config
        .as_ref()
        .map(|config| config.global_post_id.clone())
        .unwrap_or_else(|| WidgetConfig::default().global_post_id);
    let posts = config.map(|config| config.posts).unwrap_or_default();

    view! {
        <h1>{ "Feedback" }</h1>
        <ReviewSection post_id=global_post_id heading="Leave feedback"/>
        <h2>{ "Posts" }</h2>
        <For
            each=move || posts.clone()
            key=|post| post.id.clone()
            children=|post| {
                let PostEntry { id, title } = post;
                view! {
                    <article class="post-item" data-post-id=id.clone()>
                        <h3>{ title }</h3>
                        <ReviewSection post_id=id/>
                    </article>
                }
            }
        />
    }
}
