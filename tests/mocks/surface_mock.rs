use std::cell::RefCell;
use std::rc::Rc;

use review_widget::models::review::RenderedReview;
use review_widget::surface::{Notifier, ReviewContainer, ReviewInput};

/// What a container currently shows, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Message(String),
    Review(RenderedReview),
}

#[derive(Clone, Default)]
pub struct MockContainer {
    nodes: Rc<RefCell<Vec<Node>>>,
}

impl MockContainer {
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.borrow().clone()
    }

    /// Review texts, top to bottom.
    pub fn texts(&self) -> Vec<String> {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|node| match node {
                Node::Review(review) => Some(review.text.clone()),
                Node::Message(_) => None,
            })
            .collect()
    }
}

impl ReviewContainer for MockContainer {
    fn show_message(&self, message: &str) {
        *self.nodes.borrow_mut() = vec![Node::Message(message.to_string())];
    }

    fn clear(&self) {
        self.nodes.borrow_mut().clear();
    }

    fn prepend(&self, review: &RenderedReview) {
        self.nodes.borrow_mut().insert(0, Node::Review(review.clone()));
    }
}

#[derive(Clone, Default)]
pub struct MockInput {
    value: Rc<RefCell<String>>,
}

impl MockInput {
    pub fn with_value(value: &str) -> Self {
        let input = Self::default();
        *input.value.borrow_mut() = value.to_string();
        input
    }
}

impl ReviewInput for MockInput {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn clear(&self) {
        self.value.borrow_mut().clear();
    }
}

/// Records alerts instead of showing them.
#[derive(Clone, Default)]
pub struct MockNotifier {
    alerts: Rc<RefCell<Vec<String>>>,
}

impl MockNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl Notifier for MockNotifier {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}
