use crate::{error::StoreError, model::Flow, store::FlowStore};

use alloc::sync::Arc;
use core::{fmt::Display, future::Future};
use futures_util::TryFutureExt;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Bytes},
    header::CONTENT_TYPE,
    http::{request::Parts, HeaderValue},
    HeaderMap, Method, Request, Response, StatusCode,
};

/// Checks that the media type of the request (ignoring parameters such as `charset`) is JSON.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()) else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
}

/// Extracts the first `hour` query parameter. Missing and non-numeric values are both [`None`].
fn extract_hour(query: Option<&str>) -> Option<u64> {
    let (_, value) = form_urlencoded::parse(query?.as_bytes()).find(|(name, _)| name == "hour")?;
    value.parse().ok()
}

fn store_failure(err: StoreError) -> StatusCode {
    log::error!("{err}");
    if err.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn json_response(flows: &[Flow]) -> Result<Response<Full<Bytes>>, StatusCode> {
    let body = serde_json::to_vec(flows).map_err(|err| {
        log::error!("unable to serialize flows: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut res = Response::new(Full::new(Bytes::from(body)));
    res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(res)
}

async fn try_handle<B>(store: Arc<dyn FlowStore>, req: Request<B>) -> Result<Response<Full<Bytes>>, StatusCode>
where
    B: Body,
    B::Error: Display,
{
    let (Parts { uri, method, headers, .. }, incoming) = req.into_parts();

    // The greeting answers every method.
    if uri.path() == "/" {
        let mut res = Response::new(Full::new(Bytes::from_static(b"Hello World!")));
        res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        return Ok(res);
    }

    match method {
        Method::GET => match uri.path() {
            "/flows" => {
                let Some(hour) = extract_hour(uri.query()) else {
                    log::warn!("request to GET /flows without a numeric hour");
                    return Err(StatusCode::BAD_REQUEST);
                };

                let flows = store.query_by_hour(hour).await.map_err(store_failure)?;
                log::info!("GET /flows returned {} flows for hour {hour}", flows.len());
                json_response(&flows)
            }
            "/flows/all" => {
                let flows = store.query_all().await.map_err(store_failure)?;
                log::info!("GET /flows/all returned {} flows", flows.len());
                json_response(&flows)
            }
            path => {
                log::warn!("unexpected request to GET {path}");
                Err(StatusCode::NOT_FOUND)
            }
        },
        Method::POST => match uri.path() {
            "/flows" => {
                if !is_json(&headers) {
                    log::warn!("rejected flows with content type {:?}", headers.get(CONTENT_TYPE));
                    return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
                }

                let bytes = match incoming.collect().await {
                    Ok(body) => body.to_bytes(),
                    Err(err) => {
                        log::error!("unable to read flows: {err}");
                        return Err(StatusCode::BAD_REQUEST);
                    }
                };

                let flows: Vec<Flow> = match serde_json::from_slice(&bytes) {
                    Ok(flows) => flows,
                    Err(err) => {
                        log::warn!("malformed flows reported: {err}");
                        return Err(StatusCode::BAD_REQUEST);
                    }
                };

                store.merge(&flows).await.map_err(store_failure)?;
                log::info!("POST /flows added {} flows to the aggregate", flows.len());
                Ok(Response::default())
            }
            path => {
                log::warn!("unexpected request to POST {path}");
                Err(StatusCode::NOT_FOUND)
            }
        },
        method => {
            log::warn!("unexpected {method} method received");
            Err(StatusCode::METHOD_NOT_ALLOWED)
        }
    }
}

pub fn handle<B>(store: Arc<dyn FlowStore>, req: Request<B>) -> impl Future<Output = Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Display,
{
    try_handle(store, req).unwrap_or_else(|code| {
        let mut res = Response::default();
        *res.status_mut() = code;
        res
    })
}
