//! Binds review sections to markup already on the host page.
//!
//! Global section: `#review-form`, `#review-text`, `#reviews-display`.
//! Per-post sections: `.post-item[data-post-id]` holding a
//! `.post-reviews-display` and optionally a `.post-review-form` with a
//! `textarea`.

use gloo_utils::format::JsValueSerdeExt;
use leptos::logging::{error, log, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlTextAreaElement};

use crate::config::{WidgetConfig, CONFIG_GLOBAL, CONFIG_META_NAME};
use crate::error::ConfigError;
use crate::models::review::RenderedReview;
use crate::realtime::{RealtimeFeed, Subscription};
use crate::store::ReviewStore;
use crate::surface::{Notifier, ReviewContainer, ReviewInput};
use crate::widget::{ReviewThread, ReviewWidget, SupabaseWidget};

pub const GLOBAL_FORM_ID: &str = "review-form";
pub const GLOBAL_TEXTAREA_ID: &str = "review-text";
pub const GLOBAL_DISPLAY_ID: &str = "reviews-display";
pub const POST_ITEM_SELECTOR: &str = ".post-item";
pub const POST_FORM_SELECTOR: &str = ".post-review-form";
pub const POST_DISPLAY_SELECTOR: &str = ".post-reviews-display";
pub const POST_ID_ATTRIBUTE: &str = "data-post-id";
pub const REVIEW_ITEM_CLASS: &str = "review-item";
pub const REVIEW_DATE_CLASS: &str = "review-date";

/// Display element of one section.
#[derive(Clone)]
pub struct DomContainer {
    element: Element,
}

impl DomContainer {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn create(&self, tag: &str) -> Result<Element, JsValue> {
        let document = self
            .element
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container is not attached to a document"))?;
        document.create_element(tag)
    }

    fn text_paragraph(&self, text: &str, class: Option<&str>) -> Result<Element, JsValue> {
        let paragraph = self.create("p")?;
        if let Some(class) = class {
            paragraph.class_list().add_1(class)?;
        }
        paragraph.set_text_content(Some(text));
        Ok(paragraph)
    }

    fn try_show_message(&self, message: &str) -> Result<(), JsValue> {
        self.element.set_text_content(None);
        let paragraph = self.text_paragraph(message, None)?;
        self.element.append_child(&paragraph)?;
        Ok(())
    }

    fn try_prepend(&self, review: &RenderedReview) -> Result<(), JsValue> {
        let item = self.create("div")?;
        item.class_list().add_1(REVIEW_ITEM_CLASS)?;
        // Text content only: reviews are user-supplied.
        let body = self.text_paragraph(&review.text, None)?;
        item.append_child(&body)?;
        let date = self.text_paragraph(&review.timestamp, Some(REVIEW_DATE_CLASS))?;
        item.append_child(&date)?;
        self.element.prepend_with_node_1(&item)
    }
}

impl ReviewContainer for DomContainer {
    fn show_message(&self, message: &str) {
        if let Err(err) = self.try_show_message(message) {
            error!("[DOM] Could not show message: {:?}", err);
        }
    }

    fn clear(&self) {
        self.element.set_text_content(None);
    }

    fn prepend(&self, review: &RenderedReview) {
        if let Err(err) = self.try_prepend(review) {
            error!("[DOM] Could not render review: {:?}", err);
        }
    }
}

/// The textarea a section submits from.
#[derive(Clone)]
pub struct DomInput {
    textarea: HtmlTextAreaElement,
}

impl DomInput {
    pub fn new(textarea: HtmlTextAreaElement) -> Self {
        Self { textarea }
    }
}

impl ReviewInput for DomInput {
    fn value(&self) -> String {
        self.textarea.value()
    }

    fn clear(&self) {
        self.textarea.set_value("");
    }
}

/// `window.alert`
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAlert;

impl Notifier for WindowAlert {
    fn alert(&self, message: &str) {
        let shown = web_sys::window().map(|window| window.alert_with_message(message));
        if !matches!(shown, Some(Ok(()))) {
            warn!("[DOM] Could not show alert: {}", message);
        }
    }
}

/// Elements found for one section.
pub struct SectionElements {
    pub post_id: String,
    pub display: Element,
    pub form: Option<(Element, HtmlTextAreaElement)>,
}

/// Find every section on the page: the global one first, then each post in
/// document order. Sections without a display element are skipped.
pub fn discover_sections(document: &Document, global_post_id: &str) -> Vec<SectionElements> {
    let mut sections = Vec::new();

    if let Some(display) = document.get_element_by_id(GLOBAL_DISPLAY_ID) {
        let form = document.get_element_by_id(GLOBAL_FORM_ID).zip(
            document
                .get_element_by_id(GLOBAL_TEXTAREA_ID)
                .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok()),
        );
        sections.push(SectionElements {
            post_id: global_post_id.to_string(),
            display,
            form,
        });
    }

    let Ok(items) = document.query_selector_all(POST_ITEM_SELECTOR) else {
        return sections;
    };
    for index in 0..items.length() {
        let Some(item) = items.item(index).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };
        let Some(post_id) = item
            .get_attribute(POST_ID_ATTRIBUTE)
            .filter(|id| !id.trim().is_empty())
        else {
            continue;
        };
        let Some(display) = item.query_selector(POST_DISPLAY_SELECTOR).ok().flatten() else {
            continue;
        };
        let form = item.query_selector(POST_FORM_SELECTOR).ok().flatten().and_then(|form| {
            let textarea = form
                .query_selector("textarea")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())?;
            Some((form, textarea))
        });
        sections.push(SectionElements { post_id, display, form });
    }

    sections
}

type SubmitListener = (Element, Closure<dyn FnMut(Event)>);

struct BoundSection {
    thread: Rc<ReviewThread<DomContainer>>,
    subscription: Rc<RefCell<Option<Subscription>>>,
    disposed: Rc<Cell<bool>>,
    listener: Option<SubmitListener>,
}

impl BoundSection {
    fn dispose(self) {
        self.disposed.set(true);
        if let Some((form, closure)) = self.listener {
            let _ = form
                .remove_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        }
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
    }
}

/// Sections wired to a page. Keep it alive for as long as the page shows them.
pub struct PageBinding {
    sections: Vec<BoundSection>,
}

impl PageBinding {
    pub fn post_ids(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|section| section.thread.post_id().to_string())
            .collect()
    }

    /// Detach submit handlers and close realtime channels.
    pub fn dispose(self) {
        for section in self.sections {
            section.dispose();
        }
    }
}

/// Load, subscribe and attach submit handlers for every section on the page.
pub fn bind_sections<S, R>(
    document: &Document,
    widget: Rc<ReviewWidget<S, R>>,
    global_post_id: &str,
) -> PageBinding
where
    S: ReviewStore + 'static,
    R: RealtimeFeed + 'static,
{
    let sections = discover_sections(document, global_post_id)
        .into_iter()
        .map(|elements| bind_section(widget.clone(), elements))
        .collect::<Vec<_>>();
    log!("[DOM] Bound {} review sections", sections.len());
    PageBinding { sections }
}

fn bind_section<S, R>(widget: Rc<ReviewWidget<S, R>>, elements: SectionElements) -> BoundSection
where
    S: ReviewStore + 'static,
    R: RealtimeFeed + 'static,
{
    let thread = Rc::new(widget.thread(elements.post_id, DomContainer::new(elements.display)));
    let subscription = Rc::new(RefCell::new(None));
    let disposed = Rc::new(Cell::new(false));

    {
        let widget = widget.clone();
        let thread = thread.clone();
        spawn_local(async move {
            let _ = widget.load(&thread).await;
        });
    }

    {
        let widget = widget.clone();
        let thread = thread.clone();
        let slot = subscription.clone();
        let disposed = disposed.clone();
        spawn_local(async move {
            if let Some(handle) = widget.subscribe_realtime(thread).await {
                if disposed.get() {
                    handle.unsubscribe();
                } else {
                    *slot.borrow_mut() = Some(handle);
                }
            }
        });
    }

    let listener = elements.form.and_then(|(form, textarea)| {
        let input = DomInput::new(textarea);
        let thread = thread.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            let widget = widget.clone();
            let thread = thread.clone();
            let input = input.clone();
            spawn_local(async move {
                let text = input.value();
                let _ = widget.submit(&thread, &text, &input).await;
            });
        });
        match form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref()) {
            Ok(()) => Some((form, closure)),
            Err(err) => {
                error!("[DOM] Could not attach submit handler: {:?}", err);
                None
            }
        }
    });

    BoundSection {
        thread,
        subscription,
        disposed,
        listener,
    }
}

/// Read the widget config from the page: the `reviews-config` meta tag, or a
/// `window.REVIEWS_CONFIG` object.
pub fn read_page_config(document: &Document) -> Result<WidgetConfig, ConfigError> {
    let selector = format!("meta[name=\"{}\"]", CONFIG_META_NAME);
    if let Some(content) = document
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"))
    {
        return WidgetConfig::from_json(&content);
    }

    let global = web_sys::window()
        .and_then(|window| js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)).ok())
        .filter(|value| !value.is_undefined() && !value.is_null())
        .ok_or_else(|| {
            ConfigError::Missing(format!("meta[name={}] or window.{}", CONFIG_META_NAME, CONFIG_GLOBAL))
        })?;
    let config: WidgetConfig = global.into_serde()?;
    config.validate()?;
    Ok(config)
}

thread_local! {
    static ACTIVE: RefCell<Option<PageBinding>> = const { RefCell::new(None) };
}

fn mount_now(document: &Document) {
    let config = match read_page_config(document) {
        Ok(config) => config,
        Err(err) => {
            error!("[DOM] Reviews not mounted: {}", err);
            return;
        }
    };
    let global_post_id = config.global_post_id.clone();
    let widget = Rc::new(SupabaseWidget::connect(config, Box::new(WindowAlert)));
    let binding = bind_sections(document, widget, &global_post_id);

    ACTIVE.with(|active| {
        if let Some(previous) = active.borrow_mut().replace(binding) {
            previous.dispose();
        }
    });
}

/// Entry point for static host pages. Binds once the document is parsed.
#[wasm_bindgen(js_name = mountReviews)]
pub fn mount_reviews() -> Result<(), JsValue> {
    crate::utils::panic_hook::init();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;

    if document.ready_state() == "loading" {
        let target = document.clone();
        let callback = Closure::once_into_js(move || mount_now(&target));
        document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
    } else {
        mount_now(&document);
    }
    Ok(())
}

/// Remove submit handlers and close every realtime channel opened by
/// [`mount_reviews`].
#[wasm_bindgen(js_name = unmountReviews)]
pub fn unmount_reviews() {
    ACTIVE.with(|active| {
        if let Some(binding) = active.borrow_mut().take() {
            binding.dispose();
        }
    });
}
