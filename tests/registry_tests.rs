//! Registry collision and resolution behavior.

mod test_support;

use rivulet_core::category::Category;
use rivulet_core::config::EngineConfig;
use rivulet_core::error::{Error, Result};
use rivulet_core::expr::ExpressionNode;
use rivulet_lang::{Args, Binding, Built, Registry, Signature};
use rivulet_operators::eval::RawValueEvaluator;
use rivulet_operators::streams::EchoStream;

fn stub_source(_node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    Ok(Built::Stream(Box::new(EchoStream::new("stub".into()))))
}

fn stub_eval(_node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(RawValueEvaluator::new(
        rivulet_core::tuple::Scalar::Null,
    ))))
}

#[test]
fn builtins_register_cleanly_under_strict_policy() {
    let registry = test_support::bootstrap();
    assert!(registry.is_strict());
    assert!(registry.len() > 40);
    for name in ["search", "sort", "unique", "merge", "min", "replace", "add", "if"] {
        assert!(registry.contains(name), "missing builtin '{name}'");
    }
}

#[test]
fn resolve_is_stable_for_a_name_registered_once() {
    let registry = test_support::bootstrap();
    let first = registry.resolve("unique").unwrap();
    let again = registry.resolve("unique").unwrap();
    assert_eq!(first.category, Category::Decorator);
    assert_eq!(again.category, Category::Decorator);
    assert_eq!(first.signature.min_args, again.signature.min_args);
}

#[test]
fn unknown_name_fails_resolution() {
    let registry = test_support::bootstrap();
    match registry.resolve("definitelyNotRegistered") {
        Err(Error::UnknownOperator { name }) => assert_eq!(name, "definitelyNotRegistered"),
        other => panic!("expected UnknownOperator, got {other:?}"),
    }
}

#[test]
fn same_category_reregistration_silently_overwrites() {
    let mut registry = Registry::new();
    registry
        .register("probe", Binding::new(Category::Source, stub_source, Signature::new(0, 0)))
        .unwrap();
    registry
        .register("probe", Binding::new(Category::Source, stub_source, Signature::new(1, 1)))
        .unwrap();
    // last write wins
    assert_eq!(registry.resolve("probe").unwrap().signature.min_args, 1);
}

#[test]
fn strict_cross_category_reregistration_is_rejected_and_first_stays_active() {
    let mut registry = Registry::new();
    registry
        .register("probe", Binding::new(Category::Source, stub_source, Signature::new(0, 0)))
        .unwrap();
    let err = registry
        .register("probe", Binding::new(Category::Evaluator, stub_eval, Signature::new(0, 0)))
        .unwrap_err();
    match err {
        Error::DuplicateBinding {
            name,
            existing,
            attempted,
        } => {
            assert_eq!(name, "probe");
            assert_eq!(existing, Category::Source);
            assert_eq!(attempted, Category::Evaluator);
        }
        other => panic!("expected DuplicateBinding, got {other:?}"),
    }
    assert_eq!(registry.resolve("probe").unwrap().category, Category::Source);
}

#[test]
fn lenient_cross_category_reregistration_shadows_the_earlier_binding() {
    let mut registry = Registry::lenient();
    registry
        .register("probe", Binding::new(Category::Source, stub_source, Signature::new(0, 0)))
        .unwrap();
    registry
        .register("probe", Binding::new(Category::Evaluator, stub_eval, Signature::new(0, 0)))
        .unwrap();
    // the source binding is now permanently unreachable
    assert_eq!(
        registry.resolve("probe").unwrap().category,
        Category::Evaluator
    );
}

#[test]
fn registry_policy_follows_engine_config() {
    let lenient_cfg = EngineConfig {
        strict_bindings: false,
        ..EngineConfig::default()
    };
    assert!(!Registry::with_config(&lenient_cfg).is_strict());
    assert!(Registry::with_config(&EngineConfig::default()).is_strict());
}

#[test]
fn plugins_may_shadow_builtins_within_the_same_category() {
    let mut registry = test_support::bootstrap();
    registry
        .register("echo", Binding::new(Category::Source, stub_source, Signature::new(0, 0)))
        .unwrap();
    assert_eq!(registry.resolve("echo").unwrap().signature.max_args, 0);
}
