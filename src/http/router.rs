use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::raw::RouteDeclaration;
use crate::fixture::{FixtureLoadError, FixtureStore};

/// Methods a declaration can bind a fixture to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// Serves the fixture narrowed by the request's query parameters.
    Get,
    /// Serves the whole fixture, ignoring the request.
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("method {0} is not supported")]
pub struct UnsupportedMethod(pub String);

impl FromStr for RouteMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("GET") {
            Ok(RouteMethod::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(RouteMethod::Post)
        } else {
            Err(UnsupportedMethod(s.to_string()))
        }
    }
}

impl RouteMethod {
    /// Parses a request-line method token, which is case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(RouteMethod::Get),
            "POST" => Some(RouteMethod::Post),
            _ => None,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMethod::Get => f.write_str("GET"),
            RouteMethod::Post => f.write_str("POST"),
        }
    }
}

/// A registered endpoint: the method it answers and the fixture it serves.
#[derive(Debug, Clone)]
pub struct RouteHandler {
    pub method: RouteMethod,
    pub path: String,
    pub fixture: Arc<Value>,
}

#[derive(Debug, Error)]
#[error("{method} {route}: {source}")]
pub struct RouteLoadFailure {
    pub method: String,
    pub route: String,
    #[source]
    pub source: FixtureLoadError,
}

#[derive(Debug, Error)]
#[error("{} route fixture(s) failed to load:{}", .0.len(), list_failures(.0))]
pub struct BuildError(pub Vec<RouteLoadFailure>);

fn list_failures(failures: &[RouteLoadFailure]) -> String {
    failures.iter().map(|f| format!("\n  {f}")).collect()
}

#[derive(Debug, Default)]
struct RouteNode {
    methods: HashMap<RouteMethod, usize>,
    static_children: HashMap<String, RouteNode>,
    dynamic_child: Option<Box<RouteNode>>,
}

fn is_dynamic_segment(segment: &str) -> bool {
    segment.starts_with(':') && segment.len() > 1
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// The method+path bindings built from the configured declarations.
#[derive(Debug, Default)]
pub struct RouteTable {
    handlers: Vec<RouteHandler>,
    static_routes: HashMap<String, HashMap<RouteMethod, usize>>,
    dynamic_root: RouteNode,
}

impl RouteTable {
    /// Loads each declaration's fixture and registers a handler for it.
    ///
    /// Fixture failures are collected across all declarations and returned
    /// together. Declarations with an unsupported method are skipped with a
    /// warning.
    pub fn build(
        declarations: &[RouteDeclaration],
        store: &mut FixtureStore,
    ) -> Result<RouteTable, BuildError> {
        let mut table = RouteTable::default();
        let mut failures = Vec::new();

        for decl in declarations {
            let fixture = match store.load(&decl.response_file) {
                Ok(fixture) => fixture,
                Err(source) => {
                    failures.push(RouteLoadFailure {
                        method: decl.method.clone(),
                        route: decl.route.clone(),
                        source,
                    });
                    continue;
                }
            };

            match decl.method.parse::<RouteMethod>() {
                Ok(method) => table.insert(RouteHandler {
                    method,
                    path: decl.route.clone(),
                    fixture,
                }),
                Err(err) => {
                    warn!(route = %decl.route, error = %err, "Skipping route");
                }
            }
        }

        if failures.is_empty() {
            Ok(table)
        } else {
            Err(BuildError(failures))
        }
    }

    fn insert(&mut self, handler: RouteHandler) {
        let index = self.handlers.len();
        let method = handler.method;
        let segments = path_segments(&handler.path);
        debug!(%method, path = %handler.path, "Registering route");

        // The first declaration of a method+path keeps answering requests.
        if segments.iter().any(|seg| is_dynamic_segment(seg)) {
            let mut current = &mut self.dynamic_root;
            for seg in &segments {
                current = if is_dynamic_segment(seg) {
                    current.dynamic_child.get_or_insert_with(Default::default).as_mut()
                } else {
                    current.static_children.entry(seg.to_string()).or_default()
                };
            }
            current.methods.entry(method).or_insert(index);
        } else {
            let key = format!("/{}", segments.join("/"));
            self.static_routes
                .entry(key)
                .or_default()
                .entry(method)
                .or_insert(index);
        }

        self.handlers.push(handler);
    }

    fn match_dynamic(&self, segments: &[&str], method: RouteMethod) -> Option<usize> {
        let mut current = &self.dynamic_root;
        for seg in segments {
            current = match current.static_children.get(*seg) {
                Some(child) => child,
                None => current.dynamic_child.as_deref()?,
            };
        }
        current.methods.get(&method).copied()
    }

    /// Finds the handler for a request, trying literal paths before
    /// parameterized ones.
    pub fn find_route(&self, method: &str, path: &str) -> Option<&RouteHandler> {
        let method = RouteMethod::from_token(method)?;
        let segments = path_segments(path);
        let key = format!("/{}", segments.join("/"));

        self.static_routes
            .get(&key)
            .and_then(|methods| methods.get(&method).copied())
            .or_else(|| self.match_dynamic(&segments, method))
            .map(|index| &self.handlers[index])
    }

    /// Registered handlers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteHandler> {
        self.handlers.iter()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
