//! Request DTOs
//!
//! Data structures for API request bodies and query parameters. The wire
//! format is camelCase JSON.

use serde::Deserialize;
use validator::Validate;

use crate::domain::MessageContainer;

/// Send message request (REST body and hub payload share this shape)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 32, message = "Recipient username is required"))]
    pub recipient_username: String,

    #[validate(length(min = 1, max = 2000, message = "Content must be 1-2000 characters"))]
    pub content: String,
}

/// Upper bound a single page may request.
pub const MAX_PAGE_SIZE: i32 = 50;

const fn default_page_number() -> i32 {
    1
}

const fn default_page_size() -> i32 {
    10
}

/// Query parameters for the paginated message list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageParams {
    /// Container filter; unrecognized values fall back to Unread.
    #[serde(default)]
    pub container: Option<String>,

    #[serde(default = "default_page_number")]
    pub page_number: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

impl Default for MessageParams {
    fn default() -> Self {
        Self {
            container: None,
            page_number: default_page_number(),
            page_size: default_page_size(),
        }
    }
}

impl MessageParams {
    /// Resolve the container filter.
    pub fn container(&self) -> MessageContainer {
        self.container
            .as_deref()
            .map(MessageContainer::from_str)
            .unwrap_or_default()
    }

    /// Clamp page number and size into their valid ranges.
    pub fn normalized(mut self) -> Self {
        self.page_number = self.page_number.max(1);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_default_to_first_unread_page() {
        let params = MessageParams::default();
        assert_eq!(params.container(), MessageContainer::Unread);
        assert_eq!(params.page_number, 1);
        assert_eq!(params.page_size, 10);
    }

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let params = MessageParams {
            container: Some("Inbox".into()),
            page_number: -3,
            page_size: 500,
        }
        .normalized();
        assert_eq!(params.page_number, 1);
        assert_eq!(params.page_size, MAX_PAGE_SIZE);
        assert_eq!(params.container(), MessageContainer::Inbox);
    }

    #[test]
    fn zero_page_size_becomes_one() {
        let params = MessageParams {
            container: None,
            page_number: 2,
            page_size: 0,
        }
        .normalized();
        assert_eq!(params.page_size, 1);
        assert_eq!(params.page_number, 2);
    }

    #[test]
    fn send_message_request_rejects_empty_content() {
        let request = SendMessageRequest {
            recipient_username: "bob".into(),
            content: "".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn query_keys_are_camel_case() {
        let params: MessageParams =
            serde_json::from_str(r#"{"container":"Outbox","pageNumber":3,"pageSize":20}"#).unwrap();
        assert_eq!(params.container(), MessageContainer::Outbox);
        assert_eq!(params.page_number, 3);
        assert_eq!(params.page_size, 20);
    }
}
