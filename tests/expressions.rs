//! End-to-end tests: JSON in, values or diagnostics out

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value as JsonValue, json};
use style_expressions::{
    Color, DiagnosticCode, EngineConfig, EvaluationError, ExpressionEngine, ExpressionError,
    Feature, GeometryType, ParsingError, PropertyMap, Type, TypeError, Value, registry,
};
use style_expressions::registry::Signature;

fn evaluate(expr: &JsonValue, properties: JsonValue, zoom: f64) -> Result<Value, EvaluationError> {
    let engine = ExpressionEngine::new();
    let compiled = engine
        .parse_and_compile(expr)
        .unwrap_or_else(|errors| panic!("{expr} did not compile: {errors:?}"));
    compiled.evaluate(&Feature::from_json(&properties), zoom, &PropertyMap::new())
}

fn parse_errors(expr: &JsonValue) -> Vec<ExpressionError> {
    ExpressionEngine::new()
        .parse(expr)
        .expect_err("expression should be rejected")
}

#[rstest]
#[case(json!(["let", "a", 5, "b", 10, ["+", "a", "b"]]), Value::Number(15.0))]
#[case(json!(["let", "a", 1, ["let", "a", 2, ["*", "a", "a"]]]), Value::Number(4.0))]
#[case(json!(["concat", "a", "b", "c"]), Value::string("abc"))]
#[case(json!(["case", ["<", 1, 2], "lt", "ge"]), Value::string("lt"))]
#[case(json!(["match", "b", "a", 1, ["b", "c"], 2, 3]), Value::Number(2.0))]
#[case(json!(["coalesce", ["get", "a"], ["literal", [1, 2]]]), Value::from(json!([1, 2])))]
#[case(json!(["to_rgba", ["parse_color", "red"]]), Value::from(json!([255, 0, 0, 1])))]
#[case(json!(["typeof", ["literal", {"a": 1}]]), Value::string("object"))]
fn test_constant_expressions(#[case] expr: JsonValue, #[case] expected: Value) {
    assert_eq!(evaluate(&expr, json!({}), 0.0), Ok(expected));
}

#[test]
fn test_get_feature_property() {
    let expr = json!(["get", "x"]);
    assert_eq!(evaluate(&expr, json!({"x": 7}), 0.0), Ok(Value::Number(7.0)));
    assert!(matches!(
        evaluate(&expr, json!({}), 0.0),
        Err(EvaluationError::PropertyNotFound { ref property, .. }) if property == "x"
    ));
}

#[test]
fn test_reserved_binding_name() {
    let errors = parse_errors(&json!(["let", "get", 1, ["+", "get", 1]]));
    assert_eq!(
        errors,
        vec![ExpressionError::Parse(ParsingError::ReservedName {
            key: "[1]".to_string(),
            name: "get".to_string(),
        })]
    );
}

#[test]
fn test_zoom_placement() {
    let errors = parse_errors(&json!(["+", ["zoom"], 1]));
    assert!(matches!(
        &errors[..],
        [ExpressionError::Parse(ParsingError::InvalidPlacement { key, .. })] if key == "[1]"
    ));

    let curve = json!(["curve", ["linear"], ["zoom"], 0, 1, 10, 100]);
    assert!(ExpressionEngine::new().parse(&curve).is_ok());

    let wrapped = json!(["let", "w", 2, ["coalesce", ["curve", ["step"], ["zoom"], 0, "w", 5, 3]]]);
    assert_eq!(evaluate(&wrapped, json!({}), 7.0), Ok(Value::Number(3.0)));
}

#[test]
fn test_mismatched_comparison() {
    let errors = parse_errors(&json!(["==", 1, "a"]));
    assert_eq!(errors.len(), 1);
    let ExpressionError::Type(TypeError::NoMatchingSignature { key, operator, actual, .. }) =
        &errors[0]
    else {
        panic!("unexpected error: {:?}", errors[0]);
    };
    assert_eq!(key, "");
    assert_eq!(operator, "==");
    assert_eq!(actual, "(number, string)");
}

#[test]
fn test_one_error_per_failing_operator() {
    let errors = parse_errors(&json!([
        "case",
        ["==", 1, "a"],
        ["+", true, 1],
        ["concat", ["!", 3]]
    ]));
    let reported: Vec<(String, &str)> = errors
        .iter()
        .map(|error| match error {
            ExpressionError::Type(TypeError::NoMatchingSignature { operator, .. }) => {
                (operator.clone(), error.key())
            }
            other => panic!("unexpected error: {other:?}"),
        })
        .collect();
    assert_eq!(
        reported,
        vec![
            ("==".to_string(), "[1]"),
            ("+".to_string(), "[2]"),
            ("!".to_string(), "[3][1]"),
        ]
    );
}

/// Argument expressions paired with the type they check to
fn typed_arguments() -> Vec<(JsonValue, Type)> {
    vec![
        (json!(true), Type::Boolean),
        (json!(["literal", {"k": 1}]), Type::Object),
        (json!("s"), Type::String),
        (json!(1), Type::Number),
        (json!(["rgb", 0, 0, 0]), Type::Color),
        (json!(["literal", [1, 2]]), Type::array(Type::Number, Some(2))),
    ]
}

#[test]
fn test_every_operator_reports_one_signature_error() {
    let engine = ExpressionEngine::new();
    let mut covered = 0;

    for name in registry().names() {
        let Some(descriptor) = registry().get(name) else {
            continue;
        };
        if descriptor.custom_parse.is_some() {
            continue;
        }
        let arity = match &descriptor.signatures[0] {
            Signature::Fixed(parameters) => parameters.len(),
            Signature::Variadic { min, .. } => (*min).max(1),
        };
        if arity == 0 {
            continue;
        }
        let rejected = typed_arguments().into_iter().find(|(_, ty)| {
            let arg_types = vec![ty.clone(); arity];
            !descriptor.signatures.iter().any(|s| s.matches(&arg_types))
        });
        // Operators taking `value` accept every argument
        let Some((arg, _)) = rejected else {
            continue;
        };

        let mut expr = vec![json!(name)];
        expr.extend(std::iter::repeat_n(arg, arity));
        let expr = JsonValue::Array(expr);
        let errors = engine.parse(&expr).expect_err("mismatched arguments should be rejected");

        assert_eq!(errors.len(), 1, "{expr}: {errors:?}");
        match &errors[0] {
            ExpressionError::Type(TypeError::NoMatchingSignature { key, operator, .. }) => {
                assert_eq!(operator, name, "{expr}");
                assert_eq!(key, "", "{expr}");
            }
            other => panic!("{expr}: unexpected error {other:?}"),
        }
        covered += 1;
    }
    assert!(covered > 25, "only {covered} operators checked");
}

#[rstest]
#[case(json!(["let", "a", 5, "b", 10, ["+", "a", "b"]]))]
#[case(json!(["let", "a", 1, ["let", "b", ["literal", "a"], ["concat", "a", "b"]]]))]
#[case(json!(["case", ["has", "x"], ["get", "x"], ["literal", [1, 2]]]))]
#[case(json!(["match", ["string", ["get", "kind"]], "park", 1, ["school", "hospital"], 2, 0]))]
#[case(json!(["coalesce", ["get", "a"], ["get", "b"], ["literal", {"c": [1, 2.5]}]]))]
#[case(json!(["curve", ["exponential", 1.5], ["zoom"], 0, ["rgb", 0, 0, 0], 10, ["parse_color", "#fff"]]))]
#[case(json!(["array", "number", 3, ["get", "position"]]))]
#[case(json!(["at", 0, ["array", "string", ["get", "names"]]]))]
fn test_serialize_round_trip(#[case] expr: JsonValue) {
    let checked = ExpressionEngine::new().parse(&expr).unwrap();
    assert_eq!(checked.serialize(), expr);
}

#[test]
fn test_data_driven_style() {
    let expr = json!([
        "let",
        "width",
        ["number", ["get", "lanes"]],
        [
            "curve",
            ["linear"],
            ["zoom"],
            10,
            ["*", "width", 1],
            20,
            ["*", "width", 4]
        ]
    ]);
    let properties = json!({"lanes": 2});
    assert_eq!(evaluate(&expr, properties.clone(), 5.0), Ok(Value::Number(2.0)));
    assert_eq!(evaluate(&expr, properties.clone(), 15.0), Ok(Value::Number(5.0)));
    assert_eq!(evaluate(&expr, properties, 30.0), Ok(Value::Number(8.0)));
}

#[test]
fn test_color_by_geometry() {
    let engine = ExpressionEngine::with_config(
        EngineConfig::default().with_expected_type(Type::Color),
    );
    let compiled = engine
        .parse_and_compile(&json!([
            "match",
            ["geometry_type"],
            "Polygon",
            ["rgba", 0, 128, 0, 0.5],
            ["parse_color", "blue"]
        ]))
        .unwrap();
    assert_eq!(compiled.result_type(), &Type::Color);
    assert!(compiled.is_feature_dependent());

    let polygon = Feature::default().with_geometry_type(GeometryType::Polygon);
    let point = Feature::default().with_geometry_type(GeometryType::Point);
    let props = PropertyMap::new();
    assert_eq!(
        compiled.evaluate(&polygon, 0.0, &props),
        Ok(Value::Color(Color::from_rgba8(0.0, 128.0, 0.0, 0.5)))
    );
    assert_eq!(
        compiled.evaluate(&point, 0.0, &props),
        Ok(Value::Color(Color::new(0.0, 0.0, 1.0, 1.0)))
    );
}

#[test]
fn test_diagnostics_carry_codes_and_keys() {
    let engine = ExpressionEngine::new();
    let diagnostics = engine.diagnose(&json!(["curve", ["linear"], 1, 0, 1, 0, 2]));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::UnsortedStops);
    assert_eq!(diagnostics[0].key, "[5]");

    let diagnostics = engine.diagnose(&json!(["let", "a", ["-", "x", 1], ["+", ["-", "y", 2], "a"]]));
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.is_error()));
    assert_eq!(diagnostics[0].code, DiagnosticCode::NoMatchingSignature);
    assert_eq!(diagnostics[0].key, "[2]");
}

#[test]
fn test_compiled_expression_is_shareable() {
    let compiled = ExpressionEngine::new()
        .parse_and_compile(&json!(["*", ["number", ["get", "n"]], 2]))
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let compiled = compiled.clone();
            std::thread::spawn(move || {
                let feature = Feature::from_json(&json!({ "n": n }));
                compiled.evaluate(&feature, 0.0, &PropertyMap::new())
            })
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(
        results,
        (0..4)
            .map(|n| Ok(Value::Number(f64::from(n) * 2.0)))
            .collect::<Vec<_>>()
    );
}
