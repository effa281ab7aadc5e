//! Plant instance (sensor) registration.

use tracing::{debug, error, warn};

use super::{ApiDispatcher, CallOptions, Outcome};
use crate::error::{Error, Result};
use crate::models::instance::{
    InstanceRegistration, RegisteredInstance, ValidationErrorBody, ValidationErrors,
};
use crate::transport::{HttpRequest, Method, RequestBody};

/// Register every sensor binding in `registration`, one POST each.
///
/// POST `{base_url}/sensor-data/instance`
///
/// Bindings are sent sequentially in insertion order and results are
/// returned in the same order. The first validation rejection aborts the
/// call with [`Error::Validation`]; instances created before it stay
/// created server-side and are not reported.
///
/// Failure mapping:
/// - 400 with `type == "validation_error"` => `Err(Error::Validation)`
/// - other non-2xx => `Err(Error::Api)`
/// - timeout / too many redirects => `Ok(Outcome::Unavailable)`
/// - other transport failures => `Err(Error::Transport)`
pub async fn register_instances(
    api: &ApiDispatcher,
    registration: &InstanceRegistration,
    opts: &CallOptions,
) -> Result<Outcome<Vec<RegisteredInstance>>> {
    let credential = api.authorize().await?;

    let url = api.url(&["sensor-data", "instance"])?;
    let mut created = Vec::with_capacity(registration.sensors().len());

    for binding in registration.sensors() {
        let mut request = HttpRequest::new(Method::Post, url.clone());
        request.query = opts.params.clone();
        request.body = RequestBody::Json(registration.payload_for(binding));
        request.options = opts.request.clone();

        let response = match api.send(request, &credential).await {
            Ok(response) => response,
            Err(e) if e.is_timeout_or_redirect() => {
                error!(url = %url, error = %e, "Instance registration aborted");
                return Ok(Outcome::Unavailable(e));
            }
            Err(e) => return Err(Error::Transport(e)),
        };

        if response.status == 400 {
            if let Ok(body) = response.json::<ValidationErrorBody>() {
                if body.kind.as_deref() == Some(ValidationErrorBody::KIND) {
                    let errors = ValidationErrors::new(body.errors);
                    warn!(
                        custom_id = binding.custom_id.as_str(),
                        pid = binding.pid.as_str(),
                        errors = %errors,
                        "Instance registration rejected"
                    );
                    return Err(Error::Validation(errors));
                }
            }
        }

        if !response.is_success() {
            return Err(Error::Api {
                status: response.status,
                message: response.text(),
            });
        }

        let instance: RegisteredInstance = response.json()?;
        debug!(
            custom_id = binding.custom_id.as_str(),
            pid = binding.pid.as_str(),
            "Registered sensor"
        );
        created.push(instance);
    }

    Ok(Outcome::Success(created))
}
