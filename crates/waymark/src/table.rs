//! Route registration, table construction and dispatch.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::captures::{Captures, Spans};
use crate::config::BuildOptions;
use crate::error::{BuildError, Conflict, ErrorKind, ParamError};
use crate::handler::{BoundHandler, Chain, Handler, Middleware};
use crate::method::{flag, MethodSet, METHOD_ANY};
use crate::param::{ParamKind, Params, Value};
use crate::pattern::Pattern;
use crate::request::RouteRequest;
use crate::response::Responder;
use crate::trie::{InsertError, NodeId, Trie, ROOT};

/// A `(method, path pattern, handler)` registration.
pub struct Route<Req, Res> {
    pub method: String,
    pub path: String,
    pub handler: Option<BoundHandler<Req, Res>>,
    pub middleware: Option<Middleware<Req, Res>>,
}

impl<Req, Res> Route<Req, Res>
where
    Req: RouteRequest + 'static,
    Res: 'static,
{
    /// Route `method` requests for `path` to a typed handler.
    pub fn new<H, Args>(method: impl Into<String>, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Req, Res, Args>,
        Args: Params,
    {
        Self {
            method: method.into(),
            path: path.into(),
            handler: Some(BoundHandler::new(handler)),
            middleware: None,
        }
    }

    /// Route to a handler whose parameters are described by a compact shape
    /// string (see [`crate::Shape::parse`]).
    pub fn dynamic<F>(
        method: impl Into<String>,
        path: impl Into<String>,
        shape: &str,
        handler: F,
    ) -> Self
    where
        F: Fn(Req, Vec<Value>) -> Res + Send + Sync + 'static,
    {
        Self {
            method: method.into(),
            path: path.into(),
            handler: Some(BoundHandler::dynamic(shape, handler)),
            middleware: None,
        }
    }
}

impl<Req, Res> Route<Req, Res> {
    /// Wrap this route's handler in a middleware.
    pub fn with_middleware(mut self, middleware: Middleware<Req, Res>) -> Self {
        self.middleware = Some(middleware);
        self
    }
}

impl<Req, Res> Clone for Route<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            path: self.path.clone(),
            handler: self.handler.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl<Req, Res> fmt::Display for Route<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

impl<Req, Res> fmt::Debug for Route<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler", &self.handler)
            .field("middleware", &self.middleware.is_some())
            .finish()
    }
}

/// A route accepted into the table.
struct Entry<Req, Res> {
    method: String,
    pattern: String,
    names: Vec<String>,
    params: Vec<ParamKind>,
    handler: BoundHandler<Req, Res>,
    middleware: Option<Middleware<Req, Res>>,
}

type Fallback<Req, Res> = Arc<dyn Fn(Req) -> Res + Send + Sync>;
type Reject<Req, Res> = Arc<dyn Fn(Req, ParamError) -> Res + Send + Sync>;

/// An immutable routing table.
///
/// Matching never mutates the table, so one instance can serve any number of
/// threads concurrently.
pub struct Table<Req, Res> {
    trie: Trie,
    methods: MethodSet,
    entries: Vec<Entry<Req, Res>>,
    fallback: Fallback<Req, Res>,
    reject: Reject<Req, Res>,
}

/// Configures the fallback, the reject handler and build options.
pub struct TableBuilder<Req, Res> {
    options: BuildOptions,
    fallback: Fallback<Req, Res>,
    reject: Reject<Req, Res>,
}

impl<Req, Res> TableBuilder<Req, Res>
where
    Req: RouteRequest + 'static,
    Res: Responder + 'static,
{
    fn new() -> Self {
        Self {
            options: BuildOptions::default(),
            fallback: Arc::new(|_: Req| Res::not_found()),
            reject: Arc::new(|_: Req, error: ParamError| Res::bad_request(&error)),
        }
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Handler for requests no route matches (default: `Res::not_found`).
    pub fn fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(Req) -> Res + Send + Sync + 'static,
    {
        self.fallback = Arc::new(fallback);
        self
    }

    /// Handler for requests whose captures fail typed conversion
    /// (default: `Res::bad_request`).
    pub fn reject<F>(mut self, reject: F) -> Self
    where
        F: Fn(Req, ParamError) -> Res + Send + Sync + 'static,
    {
        self.reject = Arc::new(reject);
        self
    }

    /// Compile `routes` into a table, stopping at the first invalid route.
    pub fn build<I>(self, routes: I) -> Result<Table<Req, Res>, BuildError>
    where
        I: IntoIterator<Item = Route<Req, Res>>,
    {
        let mut table = Table {
            trie: Trie::new(),
            methods: MethodSet::default(),
            entries: Vec::new(),
            fallback: self.fallback,
            reject: self.reject,
        };

        for (index, route) in routes.into_iter().enumerate() {
            if let Err(err) = table.add(index, route, &self.options) {
                warn!(
                    index = err.index,
                    kind = %err.kind,
                    error = %err,
                    "route table build failed"
                );
                return Err(err);
            }
        }

        info!(
            routes = table.entries.len(),
            nodes = table.trie.len(),
            methods = table.methods.len(),
            "route table built"
        );
        Ok(table)
    }
}

impl<Req, Res> Table<Req, Res>
where
    Req: RouteRequest + 'static,
    Res: Responder + 'static,
{
    pub fn builder() -> TableBuilder<Req, Res> {
        TableBuilder::new()
    }

    /// Build with default options and fallbacks.
    pub fn build<I>(routes: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Route<Req, Res>>,
    {
        Self::builder().build(routes)
    }
}

impl<Req, Res> Table<Req, Res> {
    fn add(
        &mut self,
        index: usize,
        route: Route<Req, Res>,
        options: &BuildOptions,
    ) -> Result<(), BuildError> {
        let Route {
            method,
            path,
            handler,
            middleware,
        } = route;
        let fail = |kind: ErrorKind, detail: String| {
            BuildError::new(index, kind, &method, &path, detail)
        };

        if method.is_empty() {
            return Err(fail(ErrorKind::MethodEmpty, "method cannot be empty".into()));
        }
        let Some(handler) = handler else {
            return Err(fail(ErrorKind::NilHandler, "handler cannot be nil".into()));
        };

        let pattern = Pattern::parse(&path, options).map_err(|kind| {
            let detail = match kind {
                ErrorKind::PathEmpty => "path cannot be empty".to_string(),
                ErrorKind::NoInitialSlash => "no initial slash".to_string(),
                ErrorKind::OutOfRange => {
                    format!("path has more than {} parameters", options.param_ceiling())
                }
                _ => "invalid segment".to_string(),
            };
            fail(kind, detail)
        })?;

        let shape = handler.shape().map_err(|reason| {
            fail(
                ErrorKind::ConversionShapeFailure,
                format!("handler has an unsupported signature: {reason}"),
            )
        })?;

        let wildcards = pattern.param_count();
        let arity = shape.arity();
        let fits = arity == wildcards || (method == METHOD_ANY && arity < wildcards);
        if !fits {
            return Err(fail(
                ErrorKind::ParamCountMismatch,
                "path and handler have different numbers of parameters".into(),
            ));
        }

        let Some(bit) = self.methods.intern(&method) else {
            return Err(fail(
                ErrorKind::OutOfRange,
                format!("table has more than {} distinct methods", u64::BITS),
            ));
        };

        match self.trie.insert(pattern.as_bytes(), bit, self.entries.len()) {
            Ok(()) => {}
            Err(InsertError::Duplicate { existing }) => {
                return Err(fail(
                    ErrorKind::DuplicateHandler,
                    format!("duplicate handler (first registered by route {existing})"),
                ));
            }
            Err(InsertError::Conflict(terminals)) => {
                let conflicts: Vec<Conflict> = terminals
                    .iter()
                    .map(|t| Conflict {
                        method: self.methods.name(t.bit).to_string(),
                        pattern: self
                            .entries
                            .get(t.route)
                            .map_or_else(|| path.clone(), |e| e.pattern.clone()),
                    })
                    .collect();
                let listed = conflicts
                    .iter()
                    .map(Conflict::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(fail(
                    ErrorKind::ConflictingRoutes,
                    format!("wildcard and literal routes overlap: {listed}"),
                )
                .with_conflicts(conflicts));
            }
        }

        debug!(
            index,
            method = %method,
            pattern = %path,
            wildcards = ?pattern.names(),
            shape = %shape,
            "registered route"
        );

        let params = shape.kinds().to_vec();
        self.entries.push(Entry {
            method,
            pattern: path,
            names: pattern.names().to_vec(),
            params,
            handler,
            middleware,
        });
        Ok(())
    }

    /// Resolve `method` and `path` to a route index, recording captures.
    fn route_for(&self, method: &str, path: &str, spans: &mut Spans) -> Option<usize> {
        let exact = self.methods.bit(method);
        let any = self.methods.bit(METHOD_ANY);
        let mask = exact.map_or(0, flag) | any.map_or(0, flag);
        if mask == 0 {
            return None;
        }
        let node = self.trie.find(mask, path.as_bytes(), spans)?;
        self.trie.resolve(node, exact, any)
    }

    /// Route a request to its handler, or to the fallback when nothing
    /// matches. A capture that fails conversion goes to the reject handler.
    ///
    /// Captures are converted from the request as it arrived. A route's
    /// middleware runs after conversion and may replace the request it hands
    /// on without affecting the handler's arguments.
    ///
    /// Matching never backtracks. At each branch the walk commits to a
    /// literal edge whose first byte and methods fit, and only takes the
    /// wildcard edge when there is none. With `GET /a` and `~ /:x`
    /// registered, `GET /ab` follows the `a` edge, fails there and goes to
    /// the fallback, while `PUT /ab` skips that edge (it carries no `PUT`
    /// or `~` route) and reaches the `~` handler.
    pub fn dispatch(&self, req: Req) -> Res
    where
        Req: RouteRequest,
    {
        let mut spans = Spans::new();
        let Some(index) = self.route_for(req.method(), req.path(), &mut spans) else {
            trace!(method = req.method(), path = req.path(), "no route matched");
            return (self.fallback)(req);
        };

        let entry = &self.entries[index];
        let reject = |req: Req, error: ParamError| {
            trace!(route = index, %error, "path parameter rejected");
            (self.reject)(req, error)
        };
        let chain = Chain {
            middleware: entry.middleware.as_ref(),
            reject: &reject,
        };
        entry.handler.call(req, &spans, chain)
    }

    /// Run the match for `method` and `path` without invoking anything.
    pub fn lookup<'p>(&self, method: &str, path: &'p str) -> Lookup<'p> {
        let mut spans = Spans::new();
        let route = self.route_for(method, path, &mut spans);
        Lookup {
            captures: Captures::new(path, spans),
            route,
        }
    }

    /// [`Table::lookup`] for a host request.
    pub fn vars<'r>(&self, req: &'r Req) -> Lookup<'r>
    where
        Req: RouteRequest,
    {
        self.lookup(req.method(), req.path())
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The trie as a serializable tree, for diagnostics and tests.
    pub fn describe(&self) -> NodeView {
        self.view(ROOT)
    }

    fn view(&self, id: NodeId) -> NodeView {
        let node = self.trie.node(id);
        let routes = node
            .terminals
            .iter()
            .map(|t| {
                let entry = &self.entries[t.route];
                RouteView {
                    method: entry.method.clone(),
                    pattern: entry.pattern.clone(),
                    wildcards: entry.names.clone(),
                    params: entry.params.clone(),
                }
            })
            .collect();
        let mut children: Vec<NodeView> = node.children.iter().map(|&c| self.view(c)).collect();
        children.extend(node.wildcard.map(|w| self.view(w)));

        NodeView {
            label: String::from_utf8_lossy(&node.label).into_owned(),
            methods: self.methods.names_in(node.mask).map(str::to_owned).collect(),
            routes,
            children,
        }
    }
}

impl<Req, Res> fmt::Debug for Table<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("routes", &self.entries.len())
            .field("nodes", &self.trie.len())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`Table::lookup`].
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'p> {
    /// Captures gathered by the walk. On a miss, whatever was captured
    /// before the walk stopped.
    pub captures: Captures<'p>,
    /// Index of the matched route in the list the table was built from.
    pub route: Option<usize>,
}

impl Lookup<'_> {
    pub fn found(&self) -> bool {
        self.route.is_some()
    }
}

/// A serializable view of one trie node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    /// Edge label; wildcards appear as `*`.
    pub label: String,
    /// Methods reachable at or below this node.
    pub methods: Vec<String>,
    /// Routes terminating here.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView>,
}

/// A route as registered, for [`NodeView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteView {
    pub method: String,
    pub pattern: String,
    /// Wildcard names in pattern order; unnamed wildcards appear as `""`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wildcards: Vec<String>,
    /// Converters the handler declares, bound to the leading wildcards.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamKind>,
}

impl fmt::Display for RouteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}
