use crate::item::WorkItem;

/// A successfully downloaded page
///
/// Owned by the task that fetched it until it is handed to the processer.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The work item this result was fetched for
    pub request: WorkItem,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code (or the transport's equivalent)
    pub status_code: u16,

    /// Content-Type header value, if the transport reported one
    pub content_type: Option<String>,

    /// Decoded body
    pub body: String,
}

impl FetchResult {
    /// Creates a 200 result whose final URL is the request target
    pub fn new(request: WorkItem, body: impl Into<String>) -> Self {
        Self {
            final_url: request.target().to_string(),
            request,
            status_code: 200,
            content_type: None,
            body: body.into(),
        }
    }

    /// Returns whether the content type looks like HTML
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_target_as_final_url() {
        let result = FetchResult::new(WorkItem::new("https://example.com/x"), "body");
        assert_eq!(result.final_url, "https://example.com/x");
        assert_eq!(result.status_code, 200);
        assert!(!result.is_html());
    }

    #[test]
    fn test_is_html_with_charset() {
        let mut result = FetchResult::new(WorkItem::new("https://example.com/"), "");
        result.content_type = Some("text/html; charset=utf-8".to_string());
        assert!(result.is_html());
    }
}
