#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub type Req = http::Request<()>;
pub type Res = http::Response<String>;

static TRACING: Once = Once::new();

/// Route table logs to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn request(method: &str, path: &str) -> Req {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(())
        .unwrap()
}

pub fn text(body: impl Into<String>) -> Res {
    Res::new(body.into())
}

pub fn status(code: u16) -> Res {
    let mut res = Res::new(String::new());
    *res.status_mut() = http::StatusCode::from_u16(code).unwrap();
    res
}
