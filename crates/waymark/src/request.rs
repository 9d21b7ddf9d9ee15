//! What the table needs to know about a host request.

/// A request the table can route: it exposes a method and a path.
///
/// Everything else about the request is opaque to the table and handed to
/// the selected handler untouched.
pub trait RouteRequest {
    fn method(&self) -> &str;

    /// The path component, without query string.
    fn path(&self) -> &str;
}

impl<B> RouteRequest for http::Request<B> {
    fn method(&self) -> &str {
        http::Request::method(self).as_str()
    }

    fn path(&self) -> &str {
        http::Request::uri(self).path()
    }
}
