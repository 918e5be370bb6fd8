pub mod app;
pub mod components;
pub mod config;
pub mod dom;
pub mod error;
pub mod models;
pub mod realtime;
pub mod store;
pub mod surface;
pub mod utils;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{ConfigError, RealtimeError, ReviewError, StoreError};
pub use models::review::{NewReview, RenderedReview, Review, RowId};
pub use widget::{render, ReviewThread, ReviewWidget, SupabaseWidget, WidgetOptions};

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    utils::panic_hook::init();
    leptos::mount_to_body(App);
}
