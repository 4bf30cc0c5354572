use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;
use log::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, ErrorHandler};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Id assigned to the current request by [`LoggerMiddleware`]
///
/// Extracted in handlers so their logs carry the same id the client sees in
/// `x-request-id`. Outside the middleware a fresh id is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromRequest for RequestId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let id = req
            .extensions()
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate);
        ready(Ok(id))
    }
}

fn log_app_error(error: &Error, request_id: &str) {
    if let Some(app_error) = error.as_error::<AppError>() {
        app_error.log_error(request_id);
    }
}

/// Request logging middleware
///
/// Tags each request with a fresh [`RequestId`] (request extensions and the
/// `x-request-id` header) and logs start and completion. Application errors
/// are logged here under that id. Cookie values are never logged.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = RequestId::generate();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let has_session = req.cookie(crate::auth::ACCESS_COOKIE).is_some();

        info!(
            "[{}] Request started: {} {} (session cookie: {})",
            request_id, method, path, has_session
        );

        req.extensions_mut().insert(request_id.clone());
        let http_req = req.request().clone();
        let service = self.service.clone();

        Box::pin(async move {
            // Errors raised by inner middleware become responses here so they
            // carry the request id like any other response
            let mut res = match service.call(req).await {
                Ok(res) => {
                    if let Some(e) = res.response().error() {
                        log_app_error(e, request_id.as_str());
                    }
                    res.map_into_left_body()
                }
                Err(e) => {
                    log_app_error(&e, request_id.as_str());
                    info!(
                        "[{}] Request rejected: {} {} - Status: {}",
                        request_id,
                        method,
                        path,
                        e.as_response_error().status_code().as_u16()
                    );
                    ServiceResponse::from_err(e, http_req).map_into_right_body()
                }
            };

            let elapsed = start_time.elapsed();
            let status = res.status();

            if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            if status.is_server_error() {
                warn!(
                    "[{}] Request failed: {} {} - Status: {} ({}ms)",
                    request_id,
                    method,
                    path,
                    status.as_u16(),
                    elapsed.as_millis()
                );
            } else {
                info!(
                    "[{}] Request completed: {} {} - Status: {} ({}ms)",
                    request_id,
                    method,
                    path,
                    status.as_u16(),
                    elapsed.as_millis()
                );
            }

            Ok(res)
        })
    }
}
