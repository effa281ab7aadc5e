//! Plant detail lookup by PID.

use tracing::debug;

use super::{overlay, settle, ApiDispatcher, CallOptions, Outcome};
use crate::error::Result;
use crate::models::plant::PlantDetail;
use crate::transport::{HttpRequest, HttpResponse, Method};

/// Fetch plant details by PID.
///
/// GET `{base_url}/plant/detail/{pid}`
///
/// `lang` (an ISO 639-1 code) is sent as the `lang` query parameter and
/// wins over a `lang` entry in `opts.params`. Any failure after the token
/// step, including an undecodable body, yields [`Outcome::Unavailable`].
pub async fn plant_detail(
    api: &ApiDispatcher,
    pid: &str,
    lang: Option<&str>,
    opts: &CallOptions,
) -> Result<Outcome<PlantDetail>> {
    let credential = api.authorize().await?;

    let url = api.url(&["plant", "detail", pid])?;
    let mut request = HttpRequest::new(Method::Get, url.clone());
    request.query = overlay(&opts.params, lang.map(|l| ("lang", l)));
    request.options = opts.request.clone();

    let result = api
        .send(request, &credential)
        .await
        .and_then(HttpResponse::error_for_status)
        .and_then(|response| response.json::<PlantDetail>());

    if result.is_ok() {
        debug!(url = %url, "Fetched plant detail");
    }
    Ok(settle(&url, result))
}
