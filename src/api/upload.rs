//! Time-series sensor data upload.

use serde::Serialize;
use tracing::debug;

use super::{overlay, settle, ApiDispatcher, CallOptions, Outcome};
use crate::error::Result;
use crate::transport::{HttpRequest, HttpResponse, Method, QueryParams, RequestBody};

/// Upload a time-series document.
///
/// POST `{base_url}/sensor-data/upload?dry_run={bool}`
///
/// With `dry_run` the API only validates the document. A `dry_run` entry in
/// `opts.params` overrides the computed one. Resolves to `true` on a success
/// status; a rejected document, like any other failure after the token
/// step, yields [`Outcome::Unavailable`].
pub async fn upload<D>(
    api: &ApiDispatcher,
    document: &D,
    dry_run: bool,
    opts: &CallOptions,
) -> Result<Outcome<bool>>
where
    D: Serialize + ?Sized,
{
    let credential = api.authorize().await?;

    let url = api.url(&["sensor-data", "upload"])?;
    let body = serde_json::to_value(document)?;

    let defaults = QueryParams::from([("dry_run".to_string(), dry_run.to_string())]);
    let mut request = HttpRequest::new(Method::Post, url.clone());
    request.query = overlay(&defaults, opts.params.clone());
    request.body = RequestBody::Json(body);
    request.options = opts.request.clone();

    let dry_run_sent = request.query.get("dry_run").cloned().unwrap_or_default();
    let result = api
        .send(request, &credential)
        .await
        .and_then(HttpResponse::error_for_status)
        .map(|_| true);

    if result.is_ok() {
        debug!(url = %url, dry_run = dry_run_sent.as_str(), "Uploaded sensor data");
    }
    Ok(settle(&url, result))
}
