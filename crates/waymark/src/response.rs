//! Responses the table produces on its own.

use http::StatusCode;

use crate::error::ParamError;

/// A response type the table can synthesize when no handler applies.
///
/// `not_found` backs the default fallback handler; `bad_request` answers a
/// request whose captured segment failed typed conversion.
pub trait Responder: Sized {
    fn not_found() -> Self;

    fn bad_request(error: &ParamError) -> Self;
}

impl<B: From<String>> Responder for http::Response<B> {
    fn not_found() -> Self {
        with_status(StatusCode::NOT_FOUND, "404 page not found\n".to_string())
    }

    fn bad_request(error: &ParamError) -> Self {
        with_status(StatusCode::BAD_REQUEST, format!("{error}\n"))
    }
}

fn with_status<B: From<String>>(status: StatusCode, body: String) -> http::Response<B> {
    let mut response = http::Response::new(B::from(body));
    *response.status_mut() = status;
    response
}
