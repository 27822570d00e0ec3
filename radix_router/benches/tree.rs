use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use radix_router::router::Router;
use radix_router::tree::Tree;

const STATIC_ROUTES: &[&str] = &[
    "/",
    "/plaintext",
    "/json",
    "/fortune",
    "/fortune-quick",
    "/db",
    "/queries",
    "/update",
];

fn static_tree() -> Tree {
    STATIC_ROUTES
        .iter()
        .zip(1..)
        .try_fold(Tree::new(), |tree, (path, key)| tree.insert(path, key))
        .unwrap()
}

fn param_tree() -> Tree {
    [
        "/user/{id}",
        "/user/{id}/posts",
        "/user/{id}/posts/{post}",
        "/user/me",
        "/static/{*path}",
    ]
    .iter()
    .zip(1..)
    .try_fold(Tree::new(), |tree, (path, key)| tree.insert(path, key))
    .unwrap()
}

fn tree_search(c: &mut Criterion) {
    let tree = static_tree();
    let mut group = c.benchmark_group("tree_static");
    for path in STATIC_ROUTES {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| tree.search(black_box(path), |_, _| {}))
        });
    }
    group.finish();

    let tree = param_tree();
    let mut group = c.benchmark_group("tree_params");
    for path in &["/user/42", "/user/42/posts/7", "/user/me", "/static/css/site.css"] {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| tree.find(black_box(path)).map(|m| m.key()))
        });
    }
    group.finish();
}

fn router_route(c: &mut Criterion) {
    let router = Router::new();
    for path in STATIC_ROUTES {
        router.register("GET", path, *path).unwrap();
    }
    router.register("ANY", "/user/{id}", "user").unwrap();

    c.bench_function("router_static", |b| {
        b.iter(|| router.route("GET", black_box("/fortune-quick")))
    });
    c.bench_function("router_any_fallback", |b| {
        b.iter(|| router.route("POST", black_box("/user/42")))
    });
}

criterion_group!(benches, tree_search, router_route);
criterion_main!(benches);
