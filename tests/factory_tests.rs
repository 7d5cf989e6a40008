//! Construction-time validation and cleanup.

mod test_support;

use std::sync::atomic::{AtomicUsize, Ordering};

use rivulet_core::category::Category;
use rivulet_core::config::EngineConfig;
use rivulet_core::context::StreamContext;
use rivulet_core::error::{Error, Result};
use rivulet_core::expr::ExpressionNode;
use rivulet_core::tuple::Tuple;
use rivulet_lang::{Args, Binding, Built, OperatorFactory, Signature};
use rivulet_operators::traits::TupleStream;

use test_support::search;

#[test]
fn scenario_expression_resolves_categories_and_builds_a_stream() {
    let registry = test_support::bootstrap();
    assert_eq!(registry.resolve("sort").unwrap().category, Category::Decorator);
    assert_eq!(registry.resolve("unique").unwrap().category, Category::Decorator);
    assert_eq!(registry.resolve("search").unwrap().category, Category::Source);

    let expr = ExpressionNode::call("sort")
        .with_expr(
            ExpressionNode::call("unique")
                .with_expr(search("people", "id asc"))
                .with_param("over", "id"),
        )
        .with_param("by", "score desc");

    let factory = OperatorFactory::new(&registry);
    let built = factory.construct(&expr).unwrap();
    assert_eq!(built.category(), Category::Decorator);
    assert!(built.into_stream().is_ok());
}

#[test]
fn unknown_operator_aborts_the_whole_build() {
    let registry = test_support::bootstrap();
    let factory = OperatorFactory::new(&registry);
    let expr = ExpressionNode::call("sort")
        .with_expr(ExpressionNode::call("noSuchStream"))
        .with_param("by", "id asc");
    match factory.construct(&expr) {
        Err(Error::UnknownOperator { name }) => assert_eq!(name, "noSuchStream"),
        other => panic!("expected UnknownOperator, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn decorator_with_zero_children_is_an_arity_error() {
    let registry = test_support::bootstrap();
    let factory = OperatorFactory::new(&registry);
    let expr = ExpressionNode::call("sort").with_param("by", "id asc");
    match factory.construct(&expr) {
        Err(Error::Arity {
            operator,
            min,
            actual,
            ..
        }) => {
            assert_eq!(operator, "sort");
            assert_eq!(min, 1);
            assert_eq!(actual, 0);
        }
        other => panic!("expected Arity, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn evaluator_in_a_stream_position_is_a_type_mismatch_with_position() {
    let registry = test_support::bootstrap();
    let factory = OperatorFactory::new(&registry);
    let expr = ExpressionNode::call("sort")
        .with_expr(ExpressionNode::call("add").with_value(1i64).with_value(2i64))
        .with_param("by", "id asc");
    match factory.construct(&expr) {
        Err(Error::TypeMismatch {
            operator, position, ..
        }) => {
            assert_eq!(operator, "sort");
            assert_eq!(position, 1);
        }
        other => panic!("expected TypeMismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_required_parameter_aborts_construction() {
    let registry = test_support::bootstrap();
    let factory = OperatorFactory::new(&registry);
    let expr = ExpressionNode::call("sort").with_expr(search("people", "id asc"));
    match factory.construct(&expr) {
        Err(Error::MissingParameter {
            operator,
            parameter,
        }) => {
            assert_eq!(operator, "sort");
            assert_eq!(parameter, "by");
        }
        other => panic!("expected MissingParameter, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn unparsable_sort_spec_is_a_construction_error() {
    let registry = test_support::bootstrap();
    let factory = OperatorFactory::new(&registry);
    let expr = ExpressionNode::call("sort")
        .with_expr(search("people", "id asc"))
        .with_param("by", "score sideways");
    assert!(matches!(
        factory.construct(&expr),
        Err(Error::Construction { .. })
    ));
}

#[test]
fn nesting_past_the_configured_depth_is_rejected() {
    let registry = test_support::bootstrap();
    let config = EngineConfig {
        max_expr_depth: 8,
        ..EngineConfig::default()
    };
    let factory = OperatorFactory::with_config(&registry, &config);

    let mut expr = ExpressionNode::call("not").with_value(true);
    for _ in 0..10 {
        expr = ExpressionNode::call("not").with_expr(expr);
    }
    assert!(matches!(
        factory.construct(&expr),
        Err(Error::Construction { .. })
    ));
}

// Sources whose instances count close() calls, to observe sibling cleanup.
// Each test gets its own counter so the suites can run in parallel.

struct ProbeStream(&'static AtomicUsize);

impl TupleStream for ProbeStream {
    fn name(&self) -> &'static str {
        "probe"
    }
    fn open(&mut self, _ctx: &StreamContext) -> Result<()> {
        Ok(())
    }
    fn read(&mut self) -> Result<Option<Tuple>> {
        Ok(None)
    }
    fn close(&mut self) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

static SIBLING_CLOSES: AtomicUsize = AtomicUsize::new(0);

fn c_probe_sibling(_node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    Ok(Built::Stream(Box::new(ProbeStream(&SIBLING_CLOSES))))
}

static CHILD_CLOSES: AtomicUsize = AtomicUsize::new(0);

fn c_probe_child(_node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    Ok(Built::Stream(Box::new(ProbeStream(&CHILD_CLOSES))))
}

#[test]
fn failed_build_closes_already_constructed_sibling_subtrees() {
    let mut registry = test_support::bootstrap();
    registry
        .register(
            "probe",
            Binding::new(Category::Source, c_probe_sibling, Signature::new(0, 0)),
        )
        .unwrap();

    let expr = ExpressionNode::call("merge")
        .with_expr(ExpressionNode::call("probe"))
        .with_expr(ExpressionNode::call("probe"))
        .with_expr(ExpressionNode::call("noSuchStream"))
        .with_param("on", "id asc");

    let factory = OperatorFactory::new(&registry);
    assert!(matches!(
        factory.construct(&expr),
        Err(Error::UnknownOperator { .. })
    ));
    // both fully built siblings were closed before the error propagated
    assert_eq!(SIBLING_CLOSES.load(Ordering::SeqCst), 2);
}

#[test]
fn validation_failure_closes_constructed_children() {
    let mut registry = test_support::bootstrap();
    registry
        .register(
            "probe",
            Binding::new(Category::Source, c_probe_child, Signature::new(0, 0)),
        )
        .unwrap();

    // 'sort' requires its by param; the child is already built by then.
    let expr = ExpressionNode::call("sort").with_expr(ExpressionNode::call("probe"));
    let factory = OperatorFactory::new(&registry);
    assert!(matches!(
        factory.construct(&expr),
        Err(Error::MissingParameter { .. })
    ));
    assert_eq!(CHILD_CLOSES.load(Ordering::SeqCst), 1);
}
