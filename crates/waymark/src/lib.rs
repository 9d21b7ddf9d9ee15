//! Static HTTP routing table.
//!
//! Routes are `(method, path pattern, handler)` triples. A pattern is made of
//! literal segments and named wildcards (`/users/:id/orders/:order`). The
//! table compiles every route into a byte-compressed trie whose nodes carry a
//! bitmask of the methods reachable beneath them, then matches requests with
//! a single allocation-free walk.
//!
//! Construction fails fast: the first invalid or ambiguous route aborts the
//! build and is reported with its index in the route list. Two routes are
//! ambiguous when a wildcard and a literal sibling could both accept the same
//! method, since the table has no precedence rule to pick between them.
//!
//! Handlers are plain closures whose arguments after the request are typed
//! path parameters (`String`, `i64`, [`Hex`] or `u64`), bound positionally to
//! the wildcards of the pattern.
//!
//! # Usage
//!
//! ```ignore
//! use waymark::{Route, Table, METHOD_ANY};
//!
//! type Req = http::Request<()>;
//! type Res = http::Response<String>;
//!
//! let table = Table::build(vec![
//!     Route::new("GET", "/users/:id", |_req: Req, id: u64| {
//!         Res::new(format!("user {id}"))
//!     }),
//!     Route::new(METHOD_ANY, "/users/:id", |_req: Req| {
//!         let mut res = Res::new(String::new());
//!         *res.status_mut() = http::StatusCode::METHOD_NOT_ALLOWED;
//!         res
//!     }),
//! ])?;
//!
//! let res = table.dispatch(http::Request::get("/users/42").body(())?);
//! ```

pub mod captures;
pub mod config;
pub mod error;
pub mod handler;
pub mod method;
pub mod param;
pub mod pattern;
pub mod request;
pub mod response;
pub mod table;

mod trie;

pub use captures::{Captures, MAX_PARAMS};
pub use config::BuildOptions;
pub use error::{BuildError, Conflict, ErrorKind, ParamError};
pub use handler::{BoundHandler, Handler, Middleware, Next, Shape};
pub use method::METHOD_ANY;
pub use param::{Hex, Param, ParamKind, Params, Value};
pub use pattern::Pattern;
pub use request::RouteRequest;
pub use response::Responder;
pub use table::{Lookup, NodeView, Route, RouteView, Table, TableBuilder};
