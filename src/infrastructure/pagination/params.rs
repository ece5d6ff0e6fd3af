//! Page requests and their query parameters.
//!
//! Paginated resources take a free-text `q` and an offset `o`. The offset must
//! be a multiple of the resource's page size; anything else is rejected before
//! a request is built.

use reqwest::StatusCode;

use crate::domain::value_objects::Record;
use crate::infrastructure::http::{ApiRequest, ApiResponse, Transport};
use crate::shared::error::ClientError;

/// Status that marks a page as unresolved rate limiting.
pub const RATE_LIMITED: StatusCode = StatusCode::TOO_MANY_REQUESTS;

/// Validated `q`/`o` pair for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    query: Option<String>,
    offset: usize,
}

impl PageParams {
    pub fn new(query: Option<&str>, offset: usize, page_size: usize) -> Result<Self, ClientError> {
        if page_size == 0 || offset % page_size != 0 {
            return Err(ClientError::InvalidOffset { offset, page_size });
        }

        Ok(Self {
            query: query.map(str::to_string),
            offset,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn into_query(self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(query) = self.query {
            params.push(("q".to_string(), query));
        }
        params.push(("o".to_string(), self.offset.to_string()));
        params
    }
}

/// A walk over one paginated resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    pub query: Option<String>,
    /// `None` walks until an empty page
    pub max_items: Option<usize>,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(path: impl Into<String>, page_size: usize) -> Self {
        Self {
            path: path.into(),
            query: None,
            max_items: None,
            page_size,
        }
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }

    /// Reject a zero item cap or a zero page size.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.page_size == 0 {
            return Err(ClientError::InvalidOffset {
                offset: 0,
                page_size: 0,
            });
        }
        if self.max_items == Some(0) {
            return Err(ClientError::InvalidItemCap {
                value: 0,
                limit: usize::MAX,
            });
        }
        Ok(())
    }

    /// Pages fetched in bounded mode: one more than fit in the cap.
    pub fn page_count(&self) -> Option<usize> {
        self.max_items.map(|max| max / self.page_size + 1)
    }

    /// The request for page number `page`.
    pub fn page(&self, page: usize) -> Result<ApiRequest, ClientError> {
        self.at_offset(page * self.page_size)
    }

    /// The request for an explicit offset.
    pub fn at_offset(&self, offset: usize) -> Result<ApiRequest, ClientError> {
        let params = PageParams::new(self.query.as_deref(), offset, self.page_size)?;
        Ok(ApiRequest::api(self.path.clone()).with_params(params.into_query()))
    }
}

/// What one page contributed to a walk.
#[derive(Debug)]
pub enum PageOutcome {
    Records(Vec<Record>),
    /// Still rate limited after the transport gave up retrying
    Discarded(StatusCode),
}

impl PageOutcome {
    pub fn is_empty_page(&self) -> bool {
        matches!(self, PageOutcome::Records(records) if records.is_empty())
    }
}

pub(crate) fn page_outcome(request: &ApiRequest, response: ApiResponse) -> Result<PageOutcome, ClientError> {
    if response.status == RATE_LIMITED {
        return Ok(PageOutcome::Discarded(response.status));
    }
    if !response.is_success() {
        return Err(ClientError::UnexpectedStatus {
            status: response.status,
            path: request.path.clone(),
        });
    }
    Ok(PageOutcome::Records(response.json()?))
}

pub(crate) async fn fetch_page(
    transport: &dyn Transport,
    request: &ApiRequest,
) -> Result<PageOutcome, ClientError> {
    let response = transport.call(request).await?;
    page_outcome(request, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_params_with_query() {
        let params = PageParams::new(Some("cats"), 100, 50).unwrap();
        assert_eq!(
            params.into_query(),
            vec![
                ("q".to_string(), "cats".to_string()),
                ("o".to_string(), "100".to_string())
            ]
        );
    }

    #[test_case(7, 50)]
    #[test_case(50, 150)]
    #[test_case(0, 0)]
    fn test_params_reject_bad_offsets(offset: usize, page_size: usize) {
        let err = PageParams::new(None, offset, page_size).unwrap_err();
        assert!(matches!(err, ClientError::InvalidOffset { .. }));
        assert!(err.is_precondition());
    }

    #[test_case(1, 50, 1)]
    #[test_case(49, 50, 1)]
    #[test_case(50, 50, 2)]
    #[test_case(120, 50, 3)]
    #[test_case(150, 150, 2)]
    fn test_page_count(max: usize, page_size: usize, expected: usize) {
        let request = PageRequest::new("/posts", page_size).with_max_items(Some(max));
        assert_eq!(request.page_count(), Some(expected));
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let request = PageRequest::new("/posts", 50).with_max_items(Some(0));
        assert!(matches!(
            request.validate(),
            Err(ClientError::InvalidItemCap { value: 0, .. })
        ));
    }

    #[test]
    fn test_page_builds_offset() {
        let request = PageRequest::new("/fanbox/user/1", 50);
        let api = request.page(3).unwrap();
        assert_eq!(api.path, "/fanbox/user/1");
        assert_eq!(api.param("o"), Some("150"));
        assert_eq!(api.param("q"), None);
    }

    #[test]
    fn test_rate_limited_page_is_discarded() {
        let request = ApiRequest::api("/posts");
        let outcome = page_outcome(&request, ApiResponse::new(RATE_LIMITED, "{}")).unwrap();
        assert!(matches!(outcome, PageOutcome::Discarded(RATE_LIMITED)));
        assert!(!outcome.is_empty_page());
    }

    #[test]
    fn test_error_page_is_unexpected_status() {
        let request = ApiRequest::api("/posts");
        let err = page_outcome(&request, ApiResponse::new(StatusCode::NOT_FOUND, "{}")).unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedStatus { .. }));
    }
}
