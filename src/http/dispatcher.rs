use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error};

use crate::filter::{self, QueryParameters};

use super::request::Request;
use super::router::{RouteHandler, RouteMethod, RouteTable};

#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

impl JsonResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

/// Produces the response for a matched route.
///
/// GET narrows the fixture by `params`; POST always returns the whole
/// fixture.
pub fn dispatch(handler: &RouteHandler, params: &QueryParameters) -> JsonResponse {
    match handler.method {
        RouteMethod::Get => match filter::filter(&handler.fixture, params) {
            Ok(result) => JsonResponse::ok(Value::Array(result)),
            Err(err) => {
                error!(path = %handler.path, error = %err, "Cannot serve fixture");
                JsonResponse::error(500, err.to_string())
            }
        },
        RouteMethod::Post => JsonResponse::ok(Value::clone(&handler.fixture)),
    }
}

/// Request entry point shared by every connection.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
}

impl Dispatcher {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }

    pub fn handle(&self, req: &Request) -> JsonResponse {
        match self.routes.find_route(&req.method, &req.path) {
            Some(handler) => {
                debug!(method = %handler.method, path = %handler.path, "Matched route");
                dispatch(handler, &req.query_params)
            }
            None => JsonResponse::error(404, format!("Cannot {} {}", req.method, req.path)),
        }
    }
}
