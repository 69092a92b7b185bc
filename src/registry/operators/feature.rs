//! Feature data and zoom

use serde_json::Value as JsonValue;

use crate::ast::ExpressionNode;
use crate::compiler::{CompiledExpr, compiled};
use crate::evaluator::EvaluationError;
use crate::model::{Type, Value};
use crate::parser::{ParseResult, ParsingContext, ParsingError, parse_compound};
use crate::registry::{
    Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

/// Register `properties`, `geometry_type`, `id` and `zoom`
pub(super) fn register_feature_operators(registry: &mut OperatorRegistry) {
    registry.register(OperatorDescriptor::new(
        "properties",
        OperatorCategory::Feature,
        ResultType::Fixed(Type::Object),
        vec![Signature::nullary()],
        lower_properties,
    ));
    registry.register(OperatorDescriptor::new(
        "geometry_type",
        OperatorCategory::Feature,
        ResultType::Fixed(Type::String),
        vec![Signature::nullary()],
        lower_geometry_type,
    ));
    registry.register(OperatorDescriptor::new(
        "id",
        OperatorCategory::Feature,
        ResultType::Fixed(Type::Value),
        vec![Signature::nullary()],
        lower_id,
    ));
    registry.register(
        OperatorDescriptor::new(
            "zoom",
            OperatorCategory::Feature,
            ResultType::Fixed(Type::Number),
            vec![Signature::nullary()],
            lower_zoom,
        )
        .with_parse(parse_zoom),
    );
}

/// `zoom` is only valid as the input of a top-level curve
fn parse_zoom(
    descriptor: &'static OperatorDescriptor,
    args: &[JsonValue],
    context: &ParsingContext,
) -> ParseResult<ExpressionNode> {
    if !context.is_curve_input() {
        return Err(ParsingError::InvalidPlacement {
            key: context.key(),
            operator: descriptor.name.to_string(),
            message: "The \"zoom\" expression may only be used as the input to a top-level \"curve\" expression."
                .to_string(),
        });
    }
    parse_compound(descriptor, args, context)
}

fn lower_properties(_: Lowering) -> CompiledExpr {
    compiled(|ctx| Ok(Value::Object(ctx.feature.properties.clone())))
}

fn lower_geometry_type(_: Lowering) -> CompiledExpr {
    compiled(|ctx| Ok(Value::string(ctx.feature.geometry_type.as_str())))
}

fn lower_id(lowering: Lowering) -> CompiledExpr {
    let key = lowering.key;
    compiled(move |ctx| {
        ctx.feature
            .id
            .clone()
            .ok_or_else(|| EvaluationError::PropertyNotFound {
                key: key.clone(),
                property: "id".to_string(),
                context: "feature".to_string(),
            })
    })
}

fn lower_zoom(_: Lowering) -> CompiledExpr {
    compiled(|ctx| Ok(Value::Number(ctx.zoom)))
}

#[cfg(test)]
mod tests {
    use crate::engine::ExpressionEngine;
    use crate::evaluator::EvaluationError;
    use crate::model::{Feature, GeometryType, PropertyMap, Value};
    use crate::parser::{ParsingError, parse};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn evaluate(expr: serde_json::Value, feature: &Feature, zoom: f64) -> Value {
        let engine = ExpressionEngine::new();
        let compiled = engine.parse_and_compile(&expr).unwrap();
        compiled.evaluate(feature, zoom, &PropertyMap::new()).unwrap()
    }

    #[test]
    fn test_feature_accessors() {
        let feature = Feature::from_json(&json!({"kind": "park"}))
            .with_id(Value::Number(42.0))
            .with_geometry_type(GeometryType::Polygon);
        assert_eq!(evaluate(json!(["id"]), &feature, 0.0), Value::Number(42.0));
        assert_eq!(
            evaluate(json!(["geometry_type"]), &feature, 0.0),
            Value::string("Polygon")
        );
        assert_eq!(
            evaluate(json!(["get", "kind", ["properties"]]), &feature, 0.0),
            Value::string("park")
        );
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let compiled = ExpressionEngine::new()
            .parse_and_compile(&json!(["+", 1, ["number", ["id"]]]))
            .unwrap();
        let result = compiled.evaluate(&Feature::default(), 0.0, &PropertyMap::new());
        assert_eq!(
            result,
            Err(EvaluationError::PropertyNotFound {
                key: "[2][1]".to_string(),
                property: "id".to_string(),
                context: "feature".to_string(),
            })
        );
        assert_eq!(
            evaluate(json!(["coalesce", ["id"], 0]), &Feature::default(), 0.0),
            Value::Number(0.0)
        );
    }

    #[test]
    fn test_zoom_as_curve_input() {
        let expr = json!(["curve", ["linear"], ["zoom"], 0, 0, 10, 100]);
        assert_eq!(
            evaluate(expr, &Feature::default(), 5.0),
            Value::Number(50.0)
        );
    }

    #[test]
    fn test_zoom_elsewhere_rejected() {
        for expr in [
            json!(["zoom"]),
            json!(["curve", ["linear"], ["+", ["zoom"], 1], 0, 0, 10, 100]),
            json!(["+", 1, ["curve", ["step"], ["zoom"], 0, 0]]),
        ] {
            assert!(
                matches!(parse(&expr), Err(ParsingError::InvalidPlacement { .. })),
                "{expr}"
            );
        }
    }
}
