use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;
use style_expressions::{ExpressionEngine, Feature, PropertyMap, parse};

fn road_width() -> serde_json::Value {
    json!([
        "let",
        "lanes",
        ["number", ["get", "lanes"]],
        [
            "curve",
            ["exponential", 1.5],
            ["zoom"],
            5,
            ["*", "lanes", 0.5],
            18,
            ["*", "lanes", 6]
        ]
    ])
}

fn road_color() -> serde_json::Value {
    json!([
        "match",
        ["string", ["get", "class"]],
        "motorway",
        ["parse_color", "#e892a2"],
        ["trunk", "primary"],
        ["rgb", 252, 214, 164],
        ["case", ["has", "bridge"], ["rgba", 0, 0, 0, 0.6], ["parse_color", "white"]]
    ])
}

fn benchmark_parse(c: &mut Criterion) {
    let engine = ExpressionEngine::new();
    let expression = road_width();

    c.bench_function("parse_only", |b| b.iter(|| black_box(parse(black_box(&expression)))));
    c.bench_function("parse_and_check", |b| {
        b.iter(|| black_box(engine.parse(black_box(&expression))))
    });
    c.bench_function("parse_check_compile", |b| {
        b.iter(|| black_box(engine.parse_and_compile(black_box(&expression))))
    });
}

fn benchmark_evaluate(c: &mut Criterion) {
    let engine = ExpressionEngine::new();
    let feature = Feature::from_json(&json!({"lanes": 4, "class": "primary"}));
    let map_properties = PropertyMap::new();

    for (name, expression) in [("evaluate_width", road_width()), ("evaluate_color", road_color())] {
        let compiled = match engine.parse_and_compile(&expression) {
            Ok(compiled) => compiled,
            Err(errors) => panic!("{name} did not compile: {errors:?}"),
        };
        c.bench_function(name, |b| {
            b.iter(|| black_box(compiled.evaluate(&feature, black_box(12.5), &map_properties)))
        });
    }
}

criterion_group!(benches, benchmark_parse, benchmark_evaluate);
criterion_main!(benches);
