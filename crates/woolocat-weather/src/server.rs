//! HTTP endpoint for the weather relay.
//!
//! `POST /relay` with a form body (`action`, `nonce`, `location`). A bad
//! token is answered with 403 so remote callers treat it as a transport
//! failure. A relay with no token configured answers every request with 403.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Filter;

use crate::relay::{RelayRequest, RelayResponse, WeatherRelay, INVALID_TOKEN, WEATHER_ACTION};

const MAX_FORM_BYTES: u64 = 16 * 1024;

pub fn routes(
    relay: Arc<WeatherRelay>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::post()
        .and(warp::path("relay"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::form::<RelayRequest>())
        .and(warp::any().map(move || relay.clone()))
        .and_then(handle_relay)
}

async fn handle_relay(
    request: RelayRequest,
    relay: Arc<WeatherRelay>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Infallible> {
    if request.action != WEATHER_ACTION {
        tracing::debug!("Relay got unknown action '{}'", request.action);
        return Ok(warp::reply::with_status(
            warp::reply::json(&RelayResponse::error("Unknown action")),
            StatusCode::BAD_REQUEST,
        ));
    }

    if !relay.verify_remote_token(&request.nonce) {
        tracing::warn!("Relay request with invalid token rejected");
        return Ok(warp::reply::with_status(
            warp::reply::json(&RelayResponse::error(INVALID_TOKEN)),
            StatusCode::FORBIDDEN,
        ));
    }

    let response = relay.handle(&request).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}

/// Serve the relay until the process exits.
pub async fn serve(relay: Arc<WeatherRelay>, addr: SocketAddr) {
    tracing::info!("Weather relay listening on http://{}/relay", addr);
    warp::serve(routes(relay)).run(addr).await;
}
