//! Runs one request for an actor and captures the exchange.
//!
//! [`execute`] is the single code path behind every REST question. The decode
//! step is chosen by the [`Decode`] type parameter: [`Raw`] hands back the
//! response untouched, [`Json<T>`] deserializes the body into `T`.
//!
//! Whatever the outcome of the call, the capture step runs exactly once
//! before `execute` returns: with a request dumper configured the exchange is
//! written out, otherwise a debug line records that nothing was captured. A
//! failing dumper is reported through the actor's logger at warn level and
//! never changes the call's result.

use std::{any::type_name, fmt, marker::PhantomData};

use serde::de::DeserializeOwned;

use crate::screenplay::Actor;

use super::{
    ability::CallRestApi,
    capture::{CaptureRecord, ExecutionWindow},
    client::RestClient,
    error::{RestError, TransportError},
    request::RestRequest,
    response::{RestResponse, TypedResponse},
};

/// How a response is turned into the value a question answers with.
pub trait Decode: Send + Sync + 'static {
    type Output: Send;

    fn decode(response: RestResponse) -> Result<Self::Output, TransportError>;

    fn response(output: &Self::Output) -> &RestResponse;
}

/// Returns the response as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Decode for Raw {
    type Output = RestResponse;

    fn decode(response: RestResponse) -> Result<Self::Output, TransportError> {
        Ok(response)
    }

    fn response(output: &Self::Output) -> &RestResponse {
        output
    }
}

/// Deserializes the JSON body into `T`.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Json<T> {}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Json(PhantomData)
    }
}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", type_name::<T>())
    }
}

impl<T> Decode for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = TypedResponse<T>;

    fn decode(response: RestResponse) -> Result<Self::Output, TransportError> {
        match response.json::<T>() {
            Ok(data) => Ok(TypedResponse { response, data }),
            Err(source) => Err(TransportError::Decode {
                url: response.url,
                status: response.status,
                target: type_name::<T>(),
                source,
            }),
        }
    }

    fn response(output: &Self::Output) -> &RestResponse {
        &output.response
    }
}

#[tracing::instrument(
    skip_all,
    fields(actor = %actor.name(), method = %request.method(), base_url = %base_url)
)]
pub async fn execute<D: Decode>(
    actor: &Actor,
    base_url: &str,
    request: &RestRequest,
) -> Result<D::Output, RestError> {
    let ability = actor.using::<CallRestApi>()?;
    let client = ability.client(base_url)?;

    let mut window = ExecutionWindow::started();
    let outcome = match client.execute(request).await {
        Ok(response) => D::decode(response),
        Err(err) => Err(err),
    };

    if let Ok(output) = &outcome {
        window.finish();
        let status = D::response(output).status;
        actor
            .logger()
            .info(&format!("Response status code: {status}"));
    }

    capture(
        actor,
        ability,
        &client,
        request,
        outcome.as_ref().ok().map(D::response),
        window,
    );

    outcome.map_err(RestError::from)
}

fn capture(
    actor: &Actor,
    ability: &CallRestApi,
    client: &RestClient,
    request: &RestRequest,
    response: Option<&RestResponse>,
    window: ExecutionWindow,
) {
    let Some(dumper) = ability.request_dumper() else {
        actor
            .logger()
            .debug("Request dumping is not enabled; no capture record will be written");
        return;
    };

    let record = CaptureRecord::new(client, request, response, window);
    match dumper.dump(&record) {
        Ok(location) => actor.logger().info(&format!("Dumped request to: {location}")),
        Err(err) => actor
            .logger()
            .warn(&format!("Failed to dump request: {err}")),
    }
}
