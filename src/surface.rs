//! Page-side seams the widget renders into.
//!
//! The DOM binding and the Leptos components both implement these, and the
//! tests implement them with plain recorders.

use crate::models::review::RenderedReview;

pub const LOADING_MESSAGE: &str = "Loading…";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load comments.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Could not submit comment, please try again.";
pub const UNAVAILABLE_MESSAGE: &str = "Comments are unavailable.";

/// Element that displays one section's reviews, newest first.
///
/// Implementations must show `RenderedReview::text` as literal text.
pub trait ReviewContainer {
    /// Replace everything in the container with a single status line.
    fn show_message(&self, message: &str);

    /// Remove everything from the container.
    fn clear(&self);

    /// Insert a review block above all existing content.
    fn prepend(&self, review: &RenderedReview);
}

/// Text field a submission was read from.
pub trait ReviewInput {
    fn value(&self) -> String;
    fn clear(&self);
}

/// Interrupting, user-facing notice (`window.alert` in the browser).
pub trait Notifier {
    fn alert(&self, message: &str);
}
