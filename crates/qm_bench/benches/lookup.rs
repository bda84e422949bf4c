use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qm_core::{Catalog, CatalogWriter, PluralRules};
use rand::Rng;

const POLISH_RULES: [u8; 10] = [0x01, 0x01, 0xff, 0x14, 0x02, 0x04, 0xfd, 0x2c, 0x0c, 0x0e];

fn build_catalog(n: usize) -> Catalog {
    let mut w = CatalogWriter::new();
    w.set_language("pl_PL");
    w.set_numerus_rules(&POLISH_RULES).unwrap();
    w.with_context_table(true);
    for i in 0..n {
        let ctx = format!("Context{}", i % 64);
        w.add_message(&ctx, &format!("message {i}"), "", &[format!("komunikat {i}")]);
    }
    let mut c = Catalog::new();
    c.load_source(w.to_bytes().unwrap(), "").unwrap();
    c
}

fn bench_lookup(c: &mut Criterion) {
    let n = 20_000;
    let catalog = build_catalog(n);
    let mut rng = rand::rng();
    let queries: Vec<(String, String)> = (0..1024)
        .map(|_| {
            let i = rng.random_range(0..n);
            (format!("Context{}", i % 64), format!("message {i}"))
        })
        .collect();

    c.bench_function("translate_hit", |b| {
        let mut k = 0usize;
        b.iter(|| {
            let (ctx, src) = &queries[k % queries.len()];
            k += 1;
            black_box(catalog.translate(ctx, src, None, None))
        })
    });
    c.bench_function("translate_miss", |b| {
        b.iter(|| black_box(catalog.translate("Context1", "not there", None, None)))
    });
    c.bench_function("translate_foreign_context", |b| {
        b.iter(|| black_box(catalog.translate("Elsewhere", "message 1", None, None)))
    });

    let rules = PluralRules::new(&POLISH_RULES).unwrap();
    c.bench_function("plural_resolve", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for n in 0..1000 {
                acc += rules.resolve(black_box(n));
            }
            acc
        })
    });
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
