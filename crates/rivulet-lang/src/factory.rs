//! Operator factory: resolve, build depth-first, validate, construct.
//!
//! Fail-fast with cleanup: the first failure aborts the whole build, and
//! every already-constructed child or sibling subtree is closed before the
//! error propagates, so a failed build never leaks an open resource.

use rivulet_core::category::Category;
use rivulet_core::config::EngineConfig;
use rivulet_core::error::{Error, Result};
use rivulet_core::expr::{Arg, ExpressionNode};
use rivulet_core::tuple::Scalar;

use rivulet_operators::eval::{FieldValueEvaluator, RawValueEvaluator};
use rivulet_operators::traits::{Accumulator, Evaluator, TupleStream};

use crate::registry::{ArgKind, Binding, Registry};

/// A constructed operator instance, one of the three object protocols.
pub enum Built {
    Stream(Box<dyn TupleStream>),
    Evaluator(Box<dyn Evaluator>),
    Accumulator(Box<dyn Accumulator>),
}

/// Category-tagged constructed operator. Streams own their children
/// exclusively, so closing the root cascades through the whole tree.
pub struct ConstructedOperator {
    name: String,
    category: Category,
    built: Built,
}

impl ConstructedOperator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Close whatever this operator holds open. A no-op for evaluators and
    /// accumulators; for streams it cascades depth-first.
    pub fn close(&mut self) -> Result<()> {
        match &mut self.built {
            Built::Stream(s) => s.close(),
            _ => Ok(()),
        }
    }

    pub fn into_stream(self) -> Result<Box<dyn TupleStream>> {
        match self.built {
            Built::Stream(s) => Ok(s),
            _ => Err(Error::construction(
                self.name,
                format!("expression is {}, not a stream", self.category),
            )),
        }
    }

    pub fn into_evaluator(self) -> Result<Box<dyn Evaluator>> {
        match self.built {
            Built::Evaluator(e) => Ok(e),
            _ => Err(Error::construction(
                self.name,
                format!("expression is {}, not an evaluator", self.category),
            )),
        }
    }

    pub fn into_accumulator(self) -> Result<Box<dyn Accumulator>> {
        match self.built {
            Built::Accumulator(a) => Ok(a),
            _ => Err(Error::construction(
                self.name,
                format!("expression is {}, not an accumulator", self.category),
            )),
        }
    }
}

/// One fully built positional argument, handed to constructors in order.
pub enum BuiltArg {
    Value(Scalar),
    Op(ConstructedOperator),
}

impl BuiltArg {
    fn kind(&self) -> ArgKind {
        match self {
            BuiltArg::Value(_) => ArgKind::Value,
            BuiltArg::Op(op) => match op.category() {
                Category::Source | Category::Decorator => ArgKind::Stream,
                Category::Evaluator => ArgKind::Evaluator,
                Category::Accumulator => ArgKind::Accumulator,
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            BuiltArg::Value(v) => format!("a {} value", v.type_name()),
            BuiltArg::Op(op) => format!("a {}", op.category()),
        }
    }

    fn close_quietly(self) {
        if let BuiltArg::Op(mut op) = self {
            let _ = op.close();
        }
    }
}

/// Ordered argument queue a constructor drains. Anything a constructor does
/// not consume is closed by the factory on the constructor's error path, so
/// constructors must do their fallible parameter parsing *before* taking
/// operator arguments (or close what they took themselves).
pub struct Args {
    operator: String,
    items: std::collections::VecDeque<(usize, BuiltArg)>,
}

impl Args {
    fn new(operator: String, built: Vec<BuiltArg>) -> Self {
        let items = built
            .into_iter()
            .enumerate()
            .map(|(i, b)| (i + 1, b))
            .collect();
        Self { operator, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next argument with its 1-based position, for constructors that mix
    /// kinds positionally (`select`).
    pub fn next_arg(&mut self) -> Option<(usize, BuiltArg)> {
        self.items.pop_front()
    }

    pub fn take_stream(&mut self) -> Result<Box<dyn TupleStream>> {
        match self.next_arg() {
            Some((_, BuiltArg::Op(op))) if op.category().is_stream() => op.into_stream(),
            Some((pos, other)) => Err(self.mismatch(pos, "a stream", other)),
            None => Err(self.exhausted("a stream")),
        }
    }

    /// Drain the remaining arguments as streams.
    pub fn take_streams_rest(&mut self) -> Result<Vec<Box<dyn TupleStream>>> {
        let mut streams: Vec<Box<dyn TupleStream>> = Vec::with_capacity(self.items.len());
        while let Some((pos, arg)) = self.next_arg() {
            let err = match arg {
                BuiltArg::Op(op) if op.category().is_stream() => match op.into_stream() {
                    Ok(s) => {
                        streams.push(s);
                        continue;
                    }
                    Err(e) => e,
                },
                other => self.mismatch(pos, "a stream", other),
            };
            for s in &mut streams {
                let _ = s.close();
            }
            return Err(err);
        }
        Ok(streams)
    }

    pub fn take_value(&mut self) -> Result<Scalar> {
        match self.next_arg() {
            Some((_, BuiltArg::Value(v))) => Ok(v),
            Some((pos, other)) => Err(self.mismatch(pos, "a value", other)),
            None => Err(self.exhausted("a value")),
        }
    }

    /// A string value: bare field names and quoted strings both qualify.
    pub fn take_string(&mut self) -> Result<String> {
        match self.next_arg() {
            Some((_, BuiltArg::Value(Scalar::Str(s)))) => Ok(s),
            Some((pos, other)) => Err(self.mismatch(pos, "a string", other)),
            None => Err(self.exhausted("a string")),
        }
    }

    /// An evaluator operand: sub-expression evaluators pass through, bare
    /// names become field references, other literals become raw values.
    pub fn take_operand(&mut self) -> Result<Box<dyn Evaluator>> {
        match self.next_arg() {
            Some((pos, arg)) => self.operand_from(pos, arg),
            None => Err(self.exhausted("an evaluator")),
        }
    }

    pub fn take_operands_rest(&mut self) -> Result<Vec<Box<dyn Evaluator>>> {
        let mut operands = Vec::with_capacity(self.items.len());
        while let Some((pos, arg)) = self.next_arg() {
            operands.push(self.operand_from(pos, arg)?);
        }
        Ok(operands)
    }

    pub fn take_accumulator(&mut self) -> Result<Box<dyn Accumulator>> {
        match self.next_arg() {
            Some((_, BuiltArg::Op(op))) if op.category() == Category::Accumulator => {
                op.into_accumulator()
            }
            Some((pos, other)) => Err(self.mismatch(pos, "an accumulator", other)),
            None => Err(self.exhausted("an accumulator")),
        }
    }

    pub fn take_accumulators_rest(&mut self) -> Result<Vec<Box<dyn Accumulator>>> {
        let mut accumulators = Vec::with_capacity(self.items.len());
        while let Some((pos, arg)) = self.next_arg() {
            match arg {
                BuiltArg::Op(op) if op.category() == Category::Accumulator => {
                    accumulators.push(op.into_accumulator()?)
                }
                other => return Err(self.mismatch(pos, "an accumulator", other)),
            }
        }
        Ok(accumulators)
    }

    fn operand_from(&self, position: usize, arg: BuiltArg) -> Result<Box<dyn Evaluator>> {
        match arg {
            BuiltArg::Op(op) if op.category() == Category::Evaluator => op.into_evaluator(),
            BuiltArg::Value(Scalar::Str(name)) => Ok(Box::new(FieldValueEvaluator::new(name))),
            BuiltArg::Value(v) => Ok(Box::new(RawValueEvaluator::new(v))),
            other => Err(self.mismatch(position, "an evaluator", other)),
        }
    }

    /// Close every unconsumed argument, quietly.
    pub fn close_remaining(&mut self) {
        while let Some((_, arg)) = self.items.pop_front() {
            arg.close_quietly();
        }
    }

    fn mismatch(&self, position: usize, expected: &str, got: BuiltArg) -> Error {
        let actual = got.describe();
        got.close_quietly();
        Error::TypeMismatch {
            operator: self.operator.clone(),
            position,
            expected: expected.to_string(),
            actual,
        }
    }

    fn exhausted(&self, expected: &str) -> Error {
        Error::construction(
            self.operator.clone(),
            format!("constructor needed {expected} but the argument list was exhausted"),
        )
    }
}

/// Resolves nodes against a registry and assembles validated operator trees.
///
/// Reentrant: `construct` carries no shared mutable state, so independent
/// expressions may be compiled concurrently against one registry.
pub struct OperatorFactory<'a> {
    registry: &'a Registry,
    max_depth: usize,
}

impl<'a> OperatorFactory<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self::with_config(registry, &EngineConfig::default())
    }

    pub fn with_config(registry: &'a Registry, config: &EngineConfig) -> Self {
        Self {
            registry,
            max_depth: config.max_expr_depth,
        }
    }

    pub fn construct(&self, node: &ExpressionNode) -> Result<ConstructedOperator> {
        self.construct_at(node, 0)
    }

    fn construct_at(&self, node: &ExpressionNode, depth: usize) -> Result<ConstructedOperator> {
        if depth >= self.max_depth {
            return Err(Error::construction(
                &node.name,
                format!("expression nesting exceeds {}", self.max_depth),
            ));
        }

        let binding = self.registry.resolve(&node.name)?;

        // Depth-first: every child argument is fully built and validated
        // before its siblings are attempted.
        let mut built: Vec<BuiltArg> = Vec::with_capacity(node.args.len());
        for arg in &node.args {
            let next = match arg {
                Arg::Value(v) => Ok(BuiltArg::Value(v.clone())),
                Arg::Expr(child) => self.construct_at(child, depth + 1).map(BuiltArg::Op),
            };
            match next {
                Ok(b) => built.push(b),
                Err(e) => {
                    close_siblings(built);
                    return Err(e);
                }
            }
        }

        if let Err(e) = validate(node, binding, &built) {
            close_siblings(built);
            return Err(e);
        }

        tracing::debug!(
            operator = %node.name,
            category = %binding.category,
            args = built.len(),
            "constructing operator"
        );

        let mut args = Args::new(node.name.clone(), built);
        match (binding.constructor)(node, &mut args) {
            Ok(b) => Ok(ConstructedOperator {
                name: node.name.clone(),
                category: binding.category,
                built: b,
            }),
            Err(e) => {
                args.close_remaining();
                Err(e)
            }
        }
    }
}

fn close_siblings(built: Vec<BuiltArg>) {
    for arg in built {
        arg.close_quietly();
    }
}

fn validate(node: &ExpressionNode, binding: &Binding, args: &[BuiltArg]) -> Result<()> {
    let sig = &binding.signature;
    let actual = args.len();
    if actual < sig.min_args || actual > sig.max_args {
        return Err(Error::Arity {
            operator: node.name.clone(),
            min: sig.min_args,
            max: sig.max_args,
            actual,
        });
    }

    for (i, arg) in args.iter().enumerate() {
        let allowed: &[ArgKind] = if i < sig.positions.len() {
            sig.positions[i]
        } else {
            sig.rest
        };
        if allowed.is_empty() {
            // Declared max should prevent this; treat as an arity problem.
            return Err(Error::Arity {
                operator: node.name.clone(),
                min: sig.min_args,
                max: sig.positions.len(),
                actual,
            });
        }
        if !allowed.contains(&arg.kind()) {
            return Err(Error::TypeMismatch {
                operator: node.name.clone(),
                position: i + 1,
                expected: describe_kinds(allowed),
                actual: arg.describe(),
            });
        }
    }

    for param in sig.required_params {
        if node.param(param).is_none() {
            return Err(Error::MissingParameter {
                operator: node.name.clone(),
                parameter: param.to_string(),
            });
        }
    }
    Ok(())
}

fn describe_kinds(kinds: &[ArgKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}
