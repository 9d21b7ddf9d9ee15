//! Binding handlers to patterns.
//!
//! A typed handler is any closure `Fn(Req, P0, P1, ..) -> Res` whose
//! parameters after the request are [`Param`]s. [`BoundHandler::new`] erases
//! the closure behind a uniform `(request, captures)` entry point while
//! remembering its declared [`Shape`], which the table checks against the
//! pattern's wildcard count at build time.
//!
//! Captures are converted against the path that was matched, before any
//! middleware runs, so a middleware that rewrites the request cannot change
//! what the handler receives.

use std::fmt;
use std::sync::Arc;

use crate::captures::{Captures, Spans, MAX_PARAMS};
use crate::error::ParamError;
use crate::param::{Param, ParamKind, Params, Value};
use crate::request::RouteRequest;

/// A callable that takes a request followed by typed path parameters.
///
/// Implemented for closures of up to eight parameters; `Args` is the tuple of
/// parameter types and is inferred from the closure's signature.
pub trait Handler<Req, Res, Args>: Send + Sync + 'static {
    fn call(&self, req: Req, args: Args) -> Res;
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, Req, Res, $($ty,)*> Handler<Req, Res, ($($ty,)*)> for F
        where
            F: Fn(Req, $($ty,)*) -> Res + Send + Sync + 'static,
            $($ty: Param,)*
        {
            #[allow(non_snake_case)]
            fn call(&self, req: Req, ($($ty,)*): ($($ty,)*)) -> Res {
                (self)(req, $($ty,)*)
            }
        }
    };
}

impl_handler!();
impl_handler!(A0);
impl_handler!(A0, A1);
impl_handler!(A0, A1, A2);
impl_handler!(A0, A1, A2, A3);
impl_handler!(A0, A1, A2, A3, A4);
impl_handler!(A0, A1, A2, A3, A4, A5);
impl_handler!(A0, A1, A2, A3, A4, A5, A6);
impl_handler!(A0, A1, A2, A3, A4, A5, A6, A7);

/// The ordered parameter kinds a handler declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    kinds: Vec<ParamKind>,
}

impl Shape {
    pub fn new(kinds: Vec<ParamKind>) -> Self {
        Self { kinds }
    }

    /// Parse a compact shape such as `"sih"`: one letter per parameter,
    /// `s` string, `i` base-10 integer, `h` hex integer, `u` unsigned.
    pub fn parse(code: &str) -> Result<Self, String> {
        let kinds = code
            .chars()
            .map(|c| {
                ParamKind::from_code(c)
                    .ok_or_else(|| format!("unknown parameter code {c:?} in shape {code:?}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if kinds.len() > MAX_PARAMS {
            return Err(format!(
                "shape {code:?} declares more than {MAX_PARAMS} parameters"
            ));
        }
        Ok(Self { kinds })
    }

    pub fn kinds(&self) -> &[ParamKind] {
        &self.kinds
    }

    pub fn arity(&self) -> usize {
        self.kinds.len()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(Req")?;
        for kind in &self.kinds {
            write!(f, ", {}", kind.type_name())?;
        }
        f.write_str(") -> Res")
    }
}

type Invoke<Req, Res> = dyn Fn(Req, &Spans, Chain<'_, Req, Res>) -> Res + Send + Sync;

/// What runs around a bound handler for one dispatch.
pub(crate) struct Chain<'a, Req, Res> {
    pub(crate) middleware: Option<&'a Middleware<Req, Res>>,
    /// Answers a request whose captures failed conversion.
    pub(crate) reject: &'a (dyn Fn(Req, ParamError) -> Res + 'a),
}

fn erase<Req, Res, F>(invoke: F) -> Arc<Invoke<Req, Res>>
where
    F: Fn(Req, &Spans, Chain<'_, Req, Res>) -> Res + Send + Sync + 'static,
{
    Arc::new(invoke)
}

/// A type-erased handler together with its declared shape.
pub struct BoundHandler<Req, Res> {
    shape: Result<Shape, String>,
    invoke: Arc<Invoke<Req, Res>>,
}

impl<Req, Res> BoundHandler<Req, Res>
where
    Req: RouteRequest + 'static,
    Res: 'static,
{
    /// Bind a typed handler.
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: Handler<Req, Res, Args>,
        Args: Params,
    {
        let invoke = erase::<Req, Res, _>(move |req, spans, chain| {
            let args = Args::extract(&Captures::new(req.path(), *spans));
            finish(req, args, chain, |req, args| handler.call(req, args))
        });
        Self {
            shape: Ok(Shape::new(Args::SHAPE.to_vec())),
            invoke,
        }
    }

    /// Bind a handler whose parameters are described at runtime by a compact
    /// shape (see [`Shape::parse`]). Converted values arrive as a list.
    ///
    /// An unparsable shape is reported when the table is built.
    pub fn dynamic<F>(shape: &str, handler: F) -> Self
    where
        F: Fn(Req, Vec<Value>) -> Res + Send + Sync + 'static,
    {
        let shape = Shape::parse(shape);
        let kinds = shape
            .as_ref()
            .map(|s| s.kinds.clone())
            .unwrap_or_default();
        let invoke = erase::<Req, Res, _>(move |req, spans, chain| {
            let values = convert_all(&kinds, &Captures::new(req.path(), *spans));
            finish(req, values, chain, |req, values| handler(req, values))
        });
        Self { shape, invoke }
    }
}

impl<Req, Res> BoundHandler<Req, Res> {
    /// The declared shape, or why it could not be determined.
    pub fn shape(&self) -> Result<&Shape, &str> {
        self.shape.as_ref().map_err(String::as_str)
    }

    /// Convert the captures in `spans` from `req`'s path, then run the
    /// handler behind the chain's middleware.
    pub(crate) fn call(&self, req: Req, spans: &Spans, chain: Chain<'_, Req, Res>) -> Res {
        (self.invoke)(req, spans, chain)
    }
}

impl<Req, Res> Clone for BoundHandler<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            invoke: Arc::clone(&self.invoke),
        }
    }
}

impl<Req, Res> fmt::Debug for BoundHandler<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHandler")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Hand already converted arguments to `call`, through the middleware when
/// there is one. A conversion failure goes to the chain's reject handler in
/// place of `call`.
fn finish<Req, Res, A, C>(
    req: Req,
    args: Result<A, ParamError>,
    chain: Chain<'_, Req, Res>,
    call: C,
) -> Res
where
    A: Clone,
    C: Fn(Req, A) -> Res,
{
    let Some(middleware) = chain.middleware else {
        return match args {
            Ok(args) => call(req, args),
            Err(error) => (chain.reject)(req, error),
        };
    };
    let run = |req: Req| match &args {
        Ok(args) => call(req, args.clone()),
        Err(error) => (chain.reject)(req, error.clone()),
    };
    middleware.call(req, Next::new(&run))
}

fn convert_all(kinds: &[ParamKind], captures: &Captures<'_>) -> Result<Vec<Value>, ParamError> {
    kinds
        .iter()
        .enumerate()
        .map(|(index, &kind)| {
            let raw = captures.get(index).unwrap_or_default();
            kind.convert(raw).ok_or_else(|| ParamError {
                index,
                kind,
                value: raw.to_owned(),
            })
        })
        .collect()
}

/// The rest of the chain, as seen from a middleware.
pub struct Next<'a, Req, Res> {
    inner: &'a (dyn Fn(Req) -> Res + 'a),
}

impl<'a, Req, Res> Next<'a, Req, Res> {
    pub(crate) fn new(inner: &'a (dyn Fn(Req) -> Res + 'a)) -> Self {
        Self { inner }
    }

    /// Run the route's handler.
    pub fn run(self, req: Req) -> Res {
        (self.inner)(req)
    }
}

type Wrap<Req, Res> = dyn for<'a> Fn(Req, Next<'a, Req, Res>) -> Res + Send + Sync;

/// Code wrapped around a single route's handler. It may act before or after
/// calling [`Next::run`], or answer without calling it at all.
pub struct Middleware<Req, Res> {
    inner: Arc<Wrap<Req, Res>>,
}

impl<Req, Res> Middleware<Req, Res> {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(Req, Next<'a, Req, Res>) -> Res + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub(crate) fn call(&self, req: Req, next: Next<'_, Req, Res>) -> Res {
        (self.inner)(req, next)
    }
}

impl<Req, Res> Clone for Middleware<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Req, Res> fmt::Debug for Middleware<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}
