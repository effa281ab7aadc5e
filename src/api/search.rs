//! Plant search by alias.

use tracing::debug;

use super::{overlay, settle, ApiDispatcher, CallOptions, Outcome};
use crate::error::Result;
use crate::models::plant::SearchResponse;
use crate::transport::{HttpRequest, HttpResponse, Method};

/// Search plants by alias text.
///
/// GET `{base_url}/plant/search?alias={text}`
///
/// No minimum length is enforced on `alias`; the API decides.
pub async fn search(
    api: &ApiDispatcher,
    alias: &str,
    opts: &CallOptions,
) -> Result<Outcome<SearchResponse>> {
    let credential = api.authorize().await?;

    let url = api.url(&["plant", "search"])?;
    let mut request = HttpRequest::new(Method::Get, url.clone());
    request.query = overlay(&opts.params, [("alias", alias)]);
    request.options = opts.request.clone();

    let result = api
        .send(request, &credential)
        .await
        .and_then(HttpResponse::error_for_status)
        .and_then(|response| response.json::<SearchResponse>());

    if let Ok(found) = &result {
        debug!(url = %url, count = found.count, "Fetched search results");
    }
    Ok(settle(&url, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::dispatcher;
    use crate::transport::testing::RecordingTransport;
    use crate::transport::TransportError;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn found() -> serde_json::Value {
        json!({"count": 1, "results": [{"pid": "abelia chinensis", "display_pid": "Abelia chinensis", "alias": "chinese abelia", "category": "Caprifoliaceae, Abelia"}]})
    }

    #[tokio::test]
    async fn test_search_builds_request() {
        let transport = Arc::new(RecordingTransport::new().reply_json(200, found()));
        let api = dispatcher(transport.clone()).await;

        let outcome = search(&api, "abelia chinensis", &CallOptions::new()).await.unwrap();
        let resp = outcome.ok().unwrap();
        assert_eq!(resp.count, 1);
        assert_eq!(resp.results[0].alias.as_deref(), Some("chinese abelia"));

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Get);
        assert_eq!(sent.url.path(), "/api/v1/plant/search");
        assert_eq!(sent.query.get("alias").map(String::as_str), Some("abelia chinensis"));
        assert_eq!(sent.header("Authorization"), Some("Bearer TEST_TOKEN"));
    }

    #[tokio::test]
    async fn test_search_forwards_params_and_options() {
        let transport = Arc::new(RecordingTransport::new().reply_json(200, found()));
        let api = dispatcher(transport.clone()).await;
        let opts = CallOptions::new()
            .param("page", "3")
            .param("alias", "ignored")
            .max_redirects(0)
            .timeout(Duration::from_secs(5));

        let _ = search(&api, "foo", &opts).await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.query.get("page").map(String::as_str), Some("3"));
        assert_eq!(sent.query.get("alias").map(String::as_str), Some("foo"));
        assert_eq!(sent.options, opts.request);
    }

    #[tokio::test]
    async fn test_search_swallows_transport_failures() {
        for failure in [
            TransportError::Timeout,
            TransportError::TooManyRedirects,
            TransportError::Client("os error".into()),
        ] {
            let transport = Arc::new(RecordingTransport::new().reply(Err(failure.clone())));
            let api = dispatcher(transport).await;
            let outcome = search(&api, "foo", &CallOptions::new()).await.unwrap();
            assert_eq!(outcome, Outcome::Unavailable(failure));
        }
    }

    #[tokio::test]
    async fn test_search_error_status_is_unavailable() {
        let transport = Arc::new(RecordingTransport::new().reply_json(404, json!({"detail": "Not found."})));
        let api = dispatcher(transport).await;
        let outcome = search(&api, "foo", &CallOptions::new()).await.unwrap();
        assert!(matches!(outcome.failure(), Some(TransportError::Status { status: 404, .. })));
    }
}
