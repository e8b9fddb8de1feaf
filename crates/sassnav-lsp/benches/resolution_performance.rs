//! Module Graph Performance Benchmarks
//!
//! Scans and resolves a synthetic design-system workspace:
//! - one `_index.scss` forwarding every token module with a prefix
//! - component files that `@use` the index and a neighbour component

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tower_lsp::lsp_types::Url;

use sassnav_lsp::features::NavigationProvider;
use sassnav_lsp::{
    DocumentStore, MemoryFileSystem, ScannerSettings, Scanner, StoreHandle, SymbolResolver,
};

/// Token module with `count` variables and a mixin
fn generate_tokens(module: usize, count: usize) -> String {
    let mut content = String::new();
    for i in 0..count {
        content.push_str(&format!("/// Token {i} of module {module}\n$t{i}: {i}px !default;\n"));
    }
    content.push_str(&format!("@mixin apply-{module} {{\n  margin: $t0;\n}}\n"));
    content
}

fn generate_component(number: usize) -> String {
    let neighbour = if number > 0 { number - 1 } else { 0 };
    format!(
        r#"@use "../tokens" as tk;
@use "c{neighbour}";

@function scale-{number}($n) {{
  @return $n * 2;
}}

.c{number} {{
  padding: tk.$m0-t1;
  @include tk.m0-apply-0;
  width: scale-{number}(tk.$m1-t2);
}}
"#
    )
}

/// Build a workspace of `modules` token files and `components` component files
fn create_workspace(modules: usize, components: usize) -> MemoryFileSystem {
    let fs = MemoryFileSystem::new();

    let mut index = String::new();
    for m in 0..modules {
        index.push_str(&format!("@forward \"m{m}\" as m{m}-*;\n"));
        fs.insert(format!("/ws/tokens/_m{m}.scss"), generate_tokens(m, 40));
    }
    fs.insert("/ws/tokens/_index.scss", index);

    for c in 0..components {
        fs.insert(format!("/ws/components/_c{c}.scss"), generate_component(c));
    }
    fs
}

fn scanned(rt: &Runtime, modules: usize, components: usize) -> StoreHandle {
    let store = DocumentStore::shared();
    let scanner = Scanner::new(
        Arc::new(create_workspace(modules, components)),
        Arc::clone(&store),
        ScannerSettings::default(),
    );
    rt.block_on(scanner.scan(&[], Path::new("/ws"))).unwrap();
    store
}

fn component(number: usize) -> Url {
    Url::from_file_path(format!("/ws/components/_c{number}.scss")).unwrap()
}

/// Benchmark the full workspace scan
fn bench_scan(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("scan");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(3));

    for components in [50, 250] {
        group.bench_with_input(
            BenchmarkId::new("components", components),
            &components,
            |b, &count| {
                b.iter(|| black_box(scanned(&rt, 10, count)));
            },
        );
    }

    group.finish();
}

/// Benchmark symbol resolution over a scanned workspace
fn bench_resolution(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = scanned(&rt, 10, 250);
    let store = rt.block_on(store.read());

    let mut group = c.benchmark_group("resolution");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let index = Url::from_file_path("/ws/tokens/_index.scss").unwrap();
    group.bench_function("exports_forwarded_index", |b| {
        let resolver = SymbolResolver::new(&store);
        b.iter(|| black_box(resolver.resolve_exports(black_box(&index))));
    });

    let target = component(125);
    group.bench_function("visible_in_component", |b| {
        let resolver = SymbolResolver::new(&store);
        b.iter(|| black_box(resolver.resolve_visible(black_box(&target), 0)));
    });

    let token = Url::from_file_path("/ws/tokens/_m0.scss").unwrap();
    let tokens = store.get(&token).unwrap();
    let declaration = tokens.position_at(tokens.text.find("$t1").unwrap() + 1);
    group.bench_function("references_250_components", |b| {
        let provider = NavigationProvider::new(&store);
        b.iter(|| black_box(provider.references(&token, black_box(declaration), true)));
    });

    group.finish();
}

criterion_group!(benches, bench_scan, bench_resolution);
criterion_main!(benches);
