//! Widget configuration
//!
//! The browser side reads it from `<meta name="reviews-config">` or from a
//! `window.REVIEWS_CONFIG` object; the server reads `REVIEWS_*` environment
//! variables. Every source goes through [`WidgetConfig::validate`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the meta tag carrying the JSON config on rendered pages.
pub const CONFIG_META_NAME: &str = "reviews-config";
/// Name of the JS global a static host page can set instead.
pub const CONFIG_GLOBAL: &str = "REVIEWS_CONFIG";

/// A post that gets its own comment section on the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostEntry {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub supabase_url: String,

    /// Public anon key, sent as `apikey` and bearer token
    pub anon_key: String,

    pub table: String,
    pub schema: String,

    /// Open realtime subscriptions at all
    pub enable_realtime: bool,

    /// Skip rows whose id is already shown in the same section
    pub dedupe_realtime: bool,

    /// Scope key of the page-wide feedback section
    pub global_post_id: String,

    pub heartbeat_interval_ms: u32,

    pub posts: Vec<PostEntry>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            anon_key: String::new(),
            table: "reviews".to_string(),
            schema: "public".to_string(),
            enable_realtime: true,
            dedupe_realtime: true,
            global_post_id: "global-feedback".to_string(),
            heartbeat_interval_ms: 25_000,
            posts: Vec::new(),
        }
    }
}

impl WidgetConfig {
    pub fn new(supabase_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            anon_key: anon_key.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Load from `REVIEWS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.supabase_url = lookup("REVIEWS_SUPABASE_URL")
            .ok_or_else(|| ConfigError::Missing("REVIEWS_SUPABASE_URL".to_string()))?;
        config.anon_key = lookup("REVIEWS_ANON_KEY")
            .ok_or_else(|| ConfigError::Missing("REVIEWS_ANON_KEY".to_string()))?;

        if let Some(table) = lookup("REVIEWS_TABLE") {
            config.table = table;
        }
        if let Some(schema) = lookup("REVIEWS_SCHEMA") {
            config.schema = schema;
        }
        if let Some(value) = lookup("REVIEWS_ENABLE_REALTIME") {
            config.enable_realtime = parse_flag("REVIEWS_ENABLE_REALTIME", &value)?;
        }
        if let Some(value) = lookup("REVIEWS_DEDUPE_REALTIME") {
            config.dedupe_realtime = parse_flag("REVIEWS_DEDUPE_REALTIME", &value)?;
        }
        if let Some(post_id) = lookup("REVIEWS_GLOBAL_POST_ID") {
            config.global_post_id = post_id;
        }
        if let Some(value) = lookup("REVIEWS_HEARTBEAT_MS") {
            config.heartbeat_interval_ms = value.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("REVIEWS_HEARTBEAT_MS is not a number: {value}"))
            })?;
        }
        if let Some(value) = lookup("REVIEWS_POSTS") {
            config.posts = parse_posts(&value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.supabase_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing("supabaseUrl".to_string()));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "supabaseUrl must be an http(s) URL, got `{url}`"
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("anonKey".to_string()));
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::Invalid("table must not be empty".to_string()));
        }
        if self.global_post_id.trim().is_empty() {
            return Err(ConfigError::Invalid("globalPostId must not be empty".to_string()));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Invalid("heartbeatIntervalMs must be positive".to_string()));
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.supabase_url.trim().trim_end_matches('/')
    }

    /// PostgREST endpoint of the review table.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url(), self.table)
    }

    /// Realtime websocket endpoint, with the scheme switched to ws(s).
    pub fn realtime_url(&self) -> String {
        let base = self.base_url();
        let socket_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!(
            "{socket_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            urlencoding::encode(&self.anon_key)
        )
    }

    /// Channel topic for a section's insert feed.
    pub fn channel_topic(&self, post_id: &str) -> String {
        format!("realtime:{}-insert-{}", self.table, post_id)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!("{name} is not a boolean: {other}"))),
    }
}

/// `id=Title;id=Title`
fn parse_posts(value: &str) -> Result<Vec<PostEntry>, ConfigError> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, title) = entry.split_once('=').unwrap_or((entry, entry));
            let id = id.trim();
            if id.is_empty() {
                return Err(ConfigError::Invalid(format!("REVIEWS_POSTS entry has no id: {entry}")));
            }
            Ok(PostEntry {
                id: id.to_string(),
                title: title.trim().to_string(),
            })
        })
        .collect()
}
