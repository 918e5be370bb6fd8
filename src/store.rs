use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use leptos::logging::log;
use std::rc::Rc;

use crate::config::WidgetConfig;
use crate::error::StoreError;
use crate::models::review::{NewReview, Review};

/// Remote table of review rows.
#[async_trait(?Send)]
pub trait ReviewStore {
    /// All rows for `post_id`, newest first.
    async fn fetch_reviews(&self, post_id: &str) -> Result<Vec<Review>, StoreError>;

    /// Insert one row and return it as stored, with server-assigned fields.
    async fn insert_review(&self, review: &NewReview) -> Result<Review, StoreError>;
}

/// PostgREST client for the review table.
#[derive(Clone)]
pub struct RestStore {
    config: Rc<WidgetConfig>,
}

impl RestStore {
    pub fn new(config: Rc<WidgetConfig>) -> Self {
        Self { config }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = format!("Bearer {}", self.config.anon_key);
        builder
            .header("apikey", &self.config.anon_key)
            .header("Authorization", &bearer)
    }
}

/// Query URL: rows of one scope, newest first.
pub fn select_url(config: &WidgetConfig, post_id: &str) -> String {
    format!(
        "{}?select=*&post_id=eq.{}&order=created_at.desc",
        config.rest_url(),
        urlencoding::encode(post_id)
    )
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

#[async_trait(?Send)]
impl ReviewStore for RestStore {
    async fn fetch_reviews(&self, post_id: &str) -> Result<Vec<Review>, StoreError> {
        let url = select_url(&self.config, post_id);
        log!("[STORE] Fetching reviews for {}", post_id);

        let response = self.authorize(Request::get(&url)).send().await?;
        let response = ensure_success(response).await?;
        let reviews: Vec<Review> = response.json().await?;

        log!("[STORE] Received {} reviews for {}", reviews.len(), post_id);
        Ok(reviews)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, StoreError> {
        log!("[STORE] Inserting review for {}", review.post_id);

        let request = self
            .authorize(Request::post(&self.config.rest_url()))
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(review)?;
        let response = ensure_success(request.send().await?).await?;
        let stored: Review = response.json().await?;

        log!("[STORE] Stored review {:?} for {}", stored.id, stored.post_id);
        Ok(stored)
    }
}
