mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use common::{init_tracing, request, status, text, Req, Res};
use http::StatusCode;
use waymark::{Hex, Middleware, Next, ParamKind, Route, Table, Value, METHOD_ANY};

fn body(res: Res) -> String {
    res.into_body()
}

#[test]
fn two_wildcards_end_to_end() {
    init_tracing();
    let table = Table::build(vec![Route::new("GET", "/:a/:b", |_: Req, a: String, b: String| {
        text(format!("{a},{b}"))
    })])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/x/y"))), "x,y");

    let res = table.dispatch(request("GET", "/x"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(res), "404 page not found\n");

    let res = table.dispatch(request("GET", "/x/y/z"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn exact_method_wins_over_wildcard_method() {
    init_tracing();
    let table = Table::build(vec![
        Route::new("GET", "/:id", |_: Req, id: String| text(format!("get {id}"))),
        Route::new(METHOD_ANY, "/:id", |_: Req| status(405)),
    ])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/42"))), "get 42");
    assert_eq!(
        table.dispatch(request("POST", "/42")).status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(
        table.dispatch(request("BREW", "/42")).status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[test]
fn wildcard_method_keeps_leading_parameters() {
    init_tracing();
    let table = Table::build(vec![Route::new(
        METHOD_ANY,
        "/orgs/:org/repos/:repo",
        |_: Req, org: String| text(org),
    )])
    .unwrap();

    assert_eq!(body(table.dispatch(request("DELETE", "/orgs/acme/repos/site"))), "acme");
}

#[test]
fn api_style_routes() {
    init_tracing();
    let table = Table::build(vec![
        Route::new("GET", "/users/:user", |_: Req, user: String| text(format!("user {user}"))),
        Route::new("GET", "/users/:user/repos", |_: Req, user: String| {
            text(format!("repos of {user}"))
        }),
        Route::new(
            "GET",
            "/repos/:owner/:repo/issues/:number",
            |_: Req, owner: String, repo: String, number: u64| {
                text(format!("{owner}/{repo}#{number}"))
            },
        ),
        Route::new("POST", "/repos/:owner/:repo/issues", |_: Req, owner: String, repo: String| {
            text(format!("new issue on {owner}/{repo}"))
        }),
        Route::new("GET", "/emojis", |_: Req| text("emojis")),
        Route::new("GET", "/", |_: Req| text("root")),
    ])
    .unwrap();

    let cases = [
        ("GET", "/users/octocat", "user octocat"),
        ("GET", "/users/octocat/repos", "repos of octocat"),
        ("GET", "/repos/rust-lang/rust/issues/1", "rust-lang/rust#1"),
        ("POST", "/repos/rust-lang/rust/issues", "new issue on rust-lang/rust"),
        ("GET", "/emojis", "emojis"),
        ("GET", "/", "root"),
    ];
    for (method, path, expected) in cases {
        assert_eq!(body(table.dispatch(request(method, path))), expected, "{method} {path}");
    }

    for (method, path) in [
        ("GET", "/users/octocat/"),
        ("GET", "/emojis/"),
        ("POST", "/emojis"),
        ("GET", "/repos/rust-lang/rust/issues"),
    ] {
        let res = table.dispatch(request(method, path));
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{method} {path}");
    }
}

#[test]
fn typed_parameters_are_converted() {
    init_tracing();
    let table = Table::build(vec![
        Route::new("GET", "/int/:n", |_: Req, n: i64| text((n * 2).to_string())),
        Route::new("GET", "/hex/:n", |_: Req, n: Hex| text(n.0.to_string())),
        Route::new("GET", "/uint/:n", |_: Req, n: u64| text(n.to_string())),
    ])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/int/-21"))), "-42");
    assert_eq!(body(table.dispatch(request("GET", "/hex/ff"))), "255");
    assert_eq!(
        body(table.dispatch(request("GET", "/uint/18446744073709551615"))),
        u64::MAX.to_string()
    );
}

#[test]
fn conversion_failure_is_a_client_error() {
    init_tracing();
    let table = Table::build(vec![
        Route::new("GET", "/int/:n", |_: Req, n: i64| text(n.to_string())),
        Route::new("GET", "/uint/:n", |_: Req, n: u64| text(n.to_string())),
    ])
    .unwrap();

    let res = table.dispatch(request("GET", "/int/abc"));
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body(res),
        "path parameter 0 (\"abc\") is not a valid base-10 integer\n"
    );

    for path in ["/uint/-1", "/uint/+1", "/uint/18446744073709551616", "/int/"] {
        let res = table.dispatch(request("GET", path));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
    }
}

#[test]
fn dynamic_handler_receives_values() {
    init_tracing();
    let table = Table::build(vec![Route::dynamic(
        "GET",
        "/:name/:id",
        "sh",
        |_: Req, values: Vec<Value>| match values.as_slice() {
            [Value::Str(name), Value::Hex(id)] => text(format!("{name}={id}")),
            _ => status(500),
        },
    )])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/x/10"))), "x=16");
    assert_eq!(
        table.dispatch(request("GET", "/x/zz")).status(),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn custom_fallback_and_reject() {
    init_tracing();
    let table = Table::<Req, Res>::builder()
        .fallback(|req: Req| text(format!("nothing at {}", req.uri().path())))
        .reject(|_: Req, err| {
            assert_eq!(err.kind, ParamKind::Uint);
            status(422)
        })
        .build(vec![Route::new("GET", "/items/:id", |_: Req, id: u64| text(id.to_string()))])
        .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/nope"))), "nothing at /nope");
    assert_eq!(
        table.dispatch(request("GET", "/items/x")).status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[test]
fn middleware_runs_around_the_handler() {
    init_tracing();
    let wrap = Middleware::new(|req: Req, next: Next<'_, Req, Res>| {
        let res = next.run(req);
        text(format!("[{}]", res.into_body()))
    });
    let table = Table::build(vec![
        Route::new("GET", "/a/:x", |_: Req, x: String| text(x)).with_middleware(wrap),
        Route::new("GET", "/b/:x", |_: Req, x: String| text(x)),
    ])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/a/1"))), "[1]");
    assert_eq!(body(table.dispatch(request("GET", "/b/1"))), "1");
}

#[test]
fn middleware_can_answer_without_the_handler() {
    init_tracing();
    let called = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&called);
    let guard = Middleware::new(|req: Req, next: Next<'_, Req, Res>| {
        if req.headers().contains_key("authorization") {
            next.run(req)
        } else {
            status(401)
        }
    });
    let table = Table::build(vec![Route::new("GET", "/secret", move |_: Req| {
        seen.fetch_add(1, Ordering::SeqCst);
        text("ok")
    })
    .with_middleware(guard)])
    .unwrap();

    assert_eq!(
        table.dispatch(request("GET", "/secret")).status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(called.load(Ordering::SeqCst), 0);

    let authorized = http::Request::get("/secret")
        .header("authorization", "token")
        .body(())
        .unwrap();
    assert_eq!(body(table.dispatch(authorized)), "ok");
    assert_eq!(called.load(Ordering::SeqCst), 1);
}

#[test]
fn middleware_sees_rejections_as_responses() {
    init_tracing();
    let wrap = Middleware::new(|req: Req, next: Next<'_, Req, Res>| {
        let res = next.run(req);
        text(res.status().as_u16().to_string())
    });
    let table = Table::build(vec![
        Route::new("GET", "/n/:n", |_: Req, n: i64| text(n.to_string())).with_middleware(wrap),
    ])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/n/x"))), "400");
}

#[test]
fn middleware_rewrite_keeps_matched_arguments() {
    init_tracing();
    let rewrite = Middleware::new(|req: Req, next: Next<'_, Req, Res>| {
        let (mut parts, body) = req.into_parts();
        parts.uri = http::Uri::from_static("/v2/users/12345");
        next.run(http::Request::from_parts(parts, body))
    });
    let table = Table::build(vec![Route::new("GET", "/users/:id", |req: Req, id: String| {
        text(format!("{id} via {}", req.uri().path()))
    })
    .with_middleware(rewrite)])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/users/7"))), "7 via /v2/users/12345");
}

#[test]
fn literal_edge_is_committed_before_the_wildcard_method() {
    init_tracing();
    let table = Table::build(vec![
        Route::new("GET", "/a", |_: Req| text("a")),
        Route::new(METHOD_ANY, "/:x", |_: Req| text("any")),
    ])
    .unwrap();

    assert_eq!(body(table.dispatch(request("GET", "/a"))), "a");
    assert_eq!(body(table.dispatch(request("PUT", "/a"))), "any");
    assert_eq!(body(table.dispatch(request("PUT", "/ab"))), "any");
    assert_eq!(
        table.dispatch(request("GET", "/ab")).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(body(table.dispatch(request("GET", "/b"))), "any");
}

#[test]
fn shared_across_threads() {
    init_tracing();
    let table = Arc::new(
        Table::build(vec![Route::new("GET", "/echo/:n", |_: Req, n: u64| {
            text(n.to_string())
        })])
        .unwrap(),
    );

    let workers: Vec<_> = (0..4u64)
        .map(|t| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for i in 0..100 {
                    let n = t * 1000 + i;
                    let res = table.dispatch(request("GET", &format!("/echo/{n}")));
                    assert_eq!(res.into_body(), n.to_string());
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn table_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Table<Req, Res>>();
}
