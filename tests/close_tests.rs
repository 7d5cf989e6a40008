//! Close cascades, failure paths, and resource-leak checks.

mod test_support;

use std::sync::atomic::{AtomicUsize, Ordering};

use rivulet_core::category::Category;
use rivulet_core::context::StreamContext;
use rivulet_core::error::{Error, Result};
use rivulet_core::expr::ExpressionNode;
use rivulet_core::tuple::Tuple;
use rivulet_lang::{drive, Args, Binding, Built, OperatorFactory, Signature};
use rivulet_operators::traits::TupleStream;

use test_support::{context, people_backend, search};

/// Decorator whose own close always fails, after cascading to its child.
struct FailingCloseStream {
    child: Box<dyn TupleStream>,
}

impl TupleStream for FailingCloseStream {
    fn name(&self) -> &'static str {
        "failclose"
    }
    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.child.open(ctx)
    }
    fn read(&mut self) -> Result<Option<Tuple>> {
        self.child.read()
    }
    fn close(&mut self) -> Result<()> {
        // cascade first, then report our own failure
        let _ = self.child.close();
        Err(Error::stream("failclose", "release failed"))
    }
}

fn c_failclose(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Stream(Box::new(FailingCloseStream {
        child: args.take_stream()?,
    })))
}

/// Decorator that fails on the second read.
struct FlakyStream {
    child: Box<dyn TupleStream>,
    reads: usize,
}

impl TupleStream for FlakyStream {
    fn name(&self) -> &'static str {
        "flaky"
    }
    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.reads = 0;
        self.child.open(ctx)
    }
    fn read(&mut self) -> Result<Option<Tuple>> {
        self.reads += 1;
        if self.reads > 1 {
            let _ = self.child.close();
            return Err(Error::stream("flaky", "simulated mid-stream failure"));
        }
        self.child.read()
    }
    fn close(&mut self) -> Result<()> {
        self.child.close()
    }
}

fn c_flaky(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Stream(Box::new(FlakyStream {
        child: args.take_stream()?,
        reads: 0,
    })))
}

static LEAF_CLOSES: AtomicUsize = AtomicUsize::new(0);

struct CountingLeaf;

impl TupleStream for CountingLeaf {
    fn name(&self) -> &'static str {
        "leaf"
    }
    fn open(&mut self, _ctx: &StreamContext) -> Result<()> {
        Ok(())
    }
    fn read(&mut self) -> Result<Option<Tuple>> {
        Ok(None)
    }
    fn close(&mut self) -> Result<()> {
        LEAF_CLOSES.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn c_leaf(_node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    Ok(Built::Stream(Box::new(CountingLeaf)))
}

fn sig_decorator() -> Signature {
    const STREAM: &[rivulet_lang::ArgKind] = &[rivulet_lang::ArgKind::Stream];
    const P: &[&[rivulet_lang::ArgKind]] = &[STREAM];
    Signature::new(1, 1).positions(P)
}

#[test]
fn three_level_close_cascades_past_a_failing_middle_level() {
    let mut registry = test_support::bootstrap();
    registry
        .register(
            "failclose",
            Binding::new(Category::Decorator, c_failclose, sig_decorator()),
        )
        .unwrap();
    registry
        .register("leaf", Binding::new(Category::Source, c_leaf, Signature::new(0, 0)))
        .unwrap();

    // sort(failclose(leaf()), by=...)
    let expr = ExpressionNode::call("sort")
        .with_expr(ExpressionNode::call("failclose").with_expr(ExpressionNode::call("leaf")))
        .with_param("by", "id asc");

    let factory = OperatorFactory::new(&registry);
    let mut root = factory.construct(&expr).unwrap().into_stream().unwrap();

    let before = LEAF_CLOSES.load(Ordering::SeqCst);
    let result = root.close();
    // the middle level reported its failure...
    assert!(matches!(result, Err(Error::Stream { .. })));
    // ...but the bottom level was still closed
    assert_eq!(LEAF_CLOSES.load(Ordering::SeqCst), before + 1);
}

#[test]
fn mid_stream_failure_leaves_no_open_backend_cursor() {
    let mut registry = test_support::bootstrap();
    registry
        .register(
            "flaky",
            Binding::new(Category::Decorator, c_flaky, sig_decorator()),
        )
        .unwrap();

    let backend = people_backend();
    let ctx = context(&backend);

    // sort fully drains its flaky child, which fails on the second read.
    let expr = ExpressionNode::call("sort")
        .with_expr(ExpressionNode::call("flaky").with_expr(search("people", "id asc")))
        .with_param("by", "id asc");

    let factory = OperatorFactory::new(&registry);
    let mut root = factory.construct(&expr).unwrap().into_stream().unwrap();
    assert!(matches!(drive(root.as_mut(), &ctx), Err(Error::Stream { .. })));
    assert_eq!(backend.open_cursors(), 0, "cursor leaked past the cascade");
}

#[test]
fn failed_open_of_a_sibling_closes_the_already_opened_children() {
    let registry = test_support::bootstrap();
    let backend = people_backend();
    let ctx = context(&backend);

    // the second merge child queries a collection that does not exist, so
    // its open fails after the first child's cursor is already open
    let expr = ExpressionNode::call("merge")
        .with_expr(search("people", "id asc"))
        .with_expr(search("ghosts", "id asc"))
        .with_param("on", "id asc");

    let factory = OperatorFactory::new(&registry);
    let mut root = factory.construct(&expr).unwrap().into_stream().unwrap();
    assert!(drive(root.as_mut(), &ctx).is_err());
    assert_eq!(backend.open_cursors(), 0);
}

#[test]
fn independent_graphs_close_independently() {
    let registry = test_support::bootstrap();
    let backend = people_backend();
    let ctx = context(&backend);
    let factory = OperatorFactory::new(&registry);

    let expr = ExpressionNode::call("unique")
        .with_expr(search("people", "id asc"))
        .with_param("over", "id");

    let mut first = factory.construct(&expr).unwrap().into_stream().unwrap();
    let mut second = factory.construct(&expr).unwrap().into_stream().unwrap();

    first.open(&ctx).unwrap();
    second.open(&ctx).unwrap();
    assert_eq!(backend.open_cursors(), 2);

    first.close().unwrap();
    assert_eq!(backend.open_cursors(), 1);

    // the surviving graph still reads records
    assert!(second.read().unwrap().is_some());
    second.close().unwrap();
    assert_eq!(backend.open_cursors(), 0);
}

#[test]
fn close_is_idempotent_and_safe_after_failed_open() {
    let registry = test_support::bootstrap();
    let backend = people_backend();
    let ctx = context(&backend);
    let factory = OperatorFactory::new(&registry);

    let mut stream = factory
        .construct(&search("ghosts", "id asc"))
        .unwrap()
        .into_stream()
        .unwrap();
    assert!(stream.open(&ctx).is_err());
    stream.close().unwrap();
    stream.close().unwrap();
}
