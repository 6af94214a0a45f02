use criterion::{criterion_group, criterion_main, Criterion};

use signpost::pattern::path::{any, int, lit, string};
use signpost::pattern::query;
use signpost::router::Router;

#[derive(Clone, Debug, PartialEq)]
enum Intent {
    Static(usize),
    Recipe(i64, String),
    Search(String),
}

fn populated_router() -> Router<Intent> {
    let mut router = Router::new();
    for section in 0..32 {
        let name = format!("section{}", section);
        router.add(move |_| Intent::Static(section), lit(&name).then(lit("index")));
    }
    router.add(
        |((id, name), _)| Intent::Recipe(id, name),
        lit("recipes")
            .then(int())
            .zip(string())
            .with_query(query::string("t")),
    );
    router.add(
        Intent::Search,
        lit("search").then(any()).query(query::string("q")),
    );
    router
}

fn bench_matching(c: &mut Criterion) {
    let router = populated_router();

    c.bench_function("match first registered route", |b| {
        b.iter(|| router.match_url("app://section0/index"))
    });

    c.bench_function("match route behind 32 literals", |b| {
        b.iter(|| router.match_url("app://recipes/123/abc?t=A"))
    });

    c.bench_function("match wildcard route", |b| {
        b.iter(|| router.match_url("app://search/a/b/c/d?q=x"))
    });

    c.bench_function("no route matches", |b| {
        b.iter(|| router.match_url("app://nothing/here"))
    });
}

criterion_group!(benches, bench_matching);
criterion_main!(benches);
