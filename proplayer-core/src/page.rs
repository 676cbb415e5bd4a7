//! Result type for list operations.
//!
//! Pagination is cursor based: a [`ListPage`] carries the documents of one call and the
//! token to pass as `start` on the next call.

use serde::{Deserialize, Serialize};

use crate::codec::Document;

/// One page of list results.
///
/// Serializes as `{"items": [...], "nextStartToken": "..."}`.
///
/// # Example
///
/// ```ignore
/// use proplayer_core::page::ListPage;
///
/// let page = ListPage::builder(vec![])
///     .with_next_start_token("AQ")
///     .build();
///
/// assert!(page.items.is_empty());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ListPage {
    /// The documents of this page, in query order.
    pub items: Vec<Document>,
    /// Continuation token positioned after the last item. Present even when `items` is
    /// empty, in which case resuming from it yields nothing new.
    #[serde(rename = "nextStartToken")]
    pub next_start_token: String,
}

impl ListPage {
    pub fn builder(items: Vec<Document>) -> ListPageBuilder {
        ListPageBuilder::new(items)
    }
}

/// Builder for constructing [`ListPage`] instances with fluent API.
pub struct ListPageBuilder {
    items: Vec<Document>,
    next_start_token: String,
}

impl ListPageBuilder {
    pub fn new(items: Vec<Document>) -> Self {
        Self { items, next_start_token: String::new() }
    }

    pub fn with_next_start_token(mut self, token: impl Into<String>) -> Self {
        self.next_start_token = token.into();
        self
    }

    pub fn build(self) -> ListPage {
        ListPage {
            items: self.items,
            next_start_token: self.next_start_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_field_names() {
        let page = ListPage::builder(vec![])
            .with_next_start_token("AQ")
            .build();

        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({"items": [], "nextStartToken": "AQ"})
        );
    }
}
