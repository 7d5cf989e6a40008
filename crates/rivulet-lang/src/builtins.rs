//! Built-in operator table.
//!
//! One registration per line, grouped by category. `append`/`addAll` is a
//! deliberate alias pair (two names, one implementation, same category);
//! everything else binds exactly once, so the table registers cleanly under
//! a strict registry.

use rivulet_core::category::Category;
use rivulet_core::error::{Error, Result};
use rivulet_core::expr::ExpressionNode;
use rivulet_core::sort::parse_sort_spec;
use rivulet_core::tuple::{Scalar, Tuple};

use rivulet_operators::eval::arith::{ArithEvaluator, ArithOp, UnaryMathEvaluator, UnaryOp};
use rivulet_operators::eval::array::{
    AppendEvaluator, ArrayEvaluator, AscEvaluator, LengthEvaluator, ReverseEvaluator,
};
use rivulet_operators::eval::boolean::{
    AndEvaluator, CompareOp, ComparisonEvaluator, NotEvaluator, OrEvaluator,
};
use rivulet_operators::eval::cond::IfThenElseEvaluator;
use rivulet_operators::eval::misc::{CoalesceEvaluator, UuidEvaluator};
use rivulet_operators::eval::RawValueEvaluator;
use rivulet_operators::metrics::{CountMetric, MaxMetric, MeanMetric, MinMetric, SumMetric};
use rivulet_operators::ops::{ConcatOperation, ReplaceOperation};
use rivulet_operators::streams::{
    CartesianProductStream, EchoStream, HashJoinStream, HavingStream, MergeStream, RankStream,
    RollupStream, SearchStream, SelectStream, Selection, SortStream, TupStream, UniqueStream,
};

use crate::factory::{Args, Built, BuiltArg};
use crate::registry::{ArgKind, Binding, Registry, Signature};

const STREAM: &[ArgKind] = &[ArgKind::Stream];
const VALUE: &[ArgKind] = &[ArgKind::Value];
const OPERAND: &[ArgKind] = &[ArgKind::Evaluator, ArgKind::Value];
const ACCUMULATOR: &[ArgKind] = &[ArgKind::Accumulator];
const SELECTABLE: &[ArgKind] = &[ArgKind::Value, ArgKind::Accumulator];

const P_STREAM: &[&[ArgKind]] = &[STREAM];
const P_VALUE: &[&[ArgKind]] = &[VALUE];
const P_TWO_STREAMS: &[&[ArgKind]] = &[STREAM, STREAM];
const P_STREAM_VALUE: &[&[ArgKind]] = &[STREAM, VALUE];
const P_STREAM_OPERAND: &[&[ArgKind]] = &[STREAM, OPERAND];

const MANY: usize = usize::MAX;

fn source(c: crate::registry::Constructor, s: Signature) -> Binding {
    Binding::new(Category::Source, c, s)
}

fn decorator(c: crate::registry::Constructor, s: Signature) -> Binding {
    Binding::new(Category::Decorator, c, s)
}

fn evaluator(c: crate::registry::Constructor, s: Signature) -> Binding {
    Binding::new(Category::Evaluator, c, s)
}

fn accumulator(c: crate::registry::Constructor, s: Signature) -> Binding {
    Binding::new(Category::Accumulator, c, s)
}

/// Register every built-in operator. Called once at bootstrap; plugins
/// register after this and may shadow built-ins subject to registry policy.
pub fn register_builtins(r: &mut Registry) -> Result<()> {
    // source streams
    r.register("search", source(c_search, Signature::new(1, 1).positions(P_VALUE).require(&["q"])))?;
    r.register("echo", source(c_echo, Signature::new(1, 1).positions(P_VALUE)))?;
    r.register("tuple", source(c_tuple, Signature::new(0, 0)))?;

    // decorator streams
    r.register("sort", decorator(c_sort, Signature::new(1, 1).positions(P_STREAM).require(&["by"])))?;
    r.register("unique", decorator(c_unique, Signature::new(1, 1).positions(P_STREAM).require(&["over"])))?;
    r.register("top", decorator(c_top, Signature::new(1, 1).positions(P_STREAM).require(&["n", "sort"])))?;
    r.register("merge", decorator(c_merge, Signature::new(2, MANY).positions(P_TWO_STREAMS).rest(STREAM).require(&["on"])))?;
    r.register("select", decorator(c_select, Signature::new(1, MANY).positions(P_STREAM).rest(SELECTABLE)))?;
    r.register("having", decorator(c_having, Signature::new(2, 2).positions(P_STREAM_OPERAND)))?;
    r.register("rollup", decorator(c_rollup, Signature::new(2, MANY).positions(P_STREAM).rest(ACCUMULATOR).require(&["over"])))?;
    r.register("hashJoin", decorator(c_hash_join, Signature::new(2, 2).positions(P_TWO_STREAMS).require(&["on"])))?;
    r.register("cartesianProduct", decorator(c_cartesian, Signature::new(2, 2).positions(P_STREAM_VALUE)))?;

    // metrics
    r.register("min", accumulator(c_min, Signature::new(1, 1).positions(P_VALUE)))?;
    r.register("max", accumulator(c_max, Signature::new(1, 1).positions(P_VALUE)))?;
    r.register("sum", accumulator(c_sum, Signature::new(1, 1).positions(P_VALUE)))?;
    r.register("avg", accumulator(c_avg, Signature::new(1, 1).positions(P_VALUE)))?;
    r.register("count", accumulator(c_count, Signature::new(0, 0)))?;

    // record operations
    r.register("replace", accumulator(c_replace, Signature::new(1, 1).positions(P_VALUE).require(&["with"])))?;
    r.register("concat", accumulator(c_concat, Signature::new(0, 0).require(&["fields", "as"])))?;

    // evaluators
    r.register("val", evaluator(c_val, Signature::new(1, 1).positions(P_VALUE)))?;
    r.register("add", evaluator(c_add, Signature::new(2, MANY).rest(OPERAND)))?;
    r.register("sub", evaluator(c_sub, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("mult", evaluator(c_mult, Signature::new(2, MANY).rest(OPERAND)))?;
    r.register("div", evaluator(c_div, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("mod", evaluator(c_mod, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("pow", evaluator(c_pow, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("abs", evaluator(c_abs, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("round", evaluator(c_round, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("floor", evaluator(c_floor, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("ceil", evaluator(c_ceil, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("sqrt", evaluator(c_sqrt, Signature::new(1, 1).rest(OPERAND)))?;

    // boolean evaluators
    r.register("and", evaluator(c_and, Signature::new(2, MANY).rest(OPERAND)))?;
    r.register("or", evaluator(c_or, Signature::new(2, MANY).rest(OPERAND)))?;
    r.register("not", evaluator(c_not, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("eq", evaluator(c_eq, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("gt", evaluator(c_gt, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("gteq", evaluator(c_gteq, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("lt", evaluator(c_lt, Signature::new(2, 2).rest(OPERAND)))?;
    r.register("lteq", evaluator(c_lteq, Signature::new(2, 2).rest(OPERAND)))?;

    // conditional evaluators
    r.register("if", evaluator(c_if, Signature::new(3, 3).rest(OPERAND)))?;
    r.register("coalesce", evaluator(c_coalesce, Signature::new(1, MANY).rest(OPERAND)))?;

    // array evaluators
    r.register("array", evaluator(c_array, Signature::new(0, MANY).rest(OPERAND)))?;
    r.register("length", evaluator(c_length, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("rev", evaluator(c_rev, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("asc", evaluator(c_asc, Signature::new(1, 1).rest(OPERAND)))?;
    r.register("append", evaluator(c_append, Signature::new(2, MANY).rest(OPERAND)))?;
    r.register("addAll", evaluator(c_append, Signature::new(2, MANY).rest(OPERAND)))?;

    r.register("uuid", evaluator(c_uuid, Signature::new(0, 0)))?;

    Ok(())
}

fn required_param<'n>(node: &'n ExpressionNode, name: &str) -> Result<&'n str> {
    node.param(name).ok_or_else(|| Error::MissingParameter {
        operator: node.name.clone(),
        parameter: name.to_string(),
    })
}

fn csv_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

// --- source stream constructors ---

fn c_search(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let collection = args.take_string()?;
    let query = required_param(node, "q")?.to_string();
    let fields = node.param("fl").map(csv_list).unwrap_or_default();
    let sort = match node.param("sort") {
        Some(spec) => parse_sort_spec(spec).map_err(|e| Error::construction("search", e))?,
        None => Vec::new(),
    };
    Ok(Built::Stream(Box::new(SearchStream::new(
        collection, query, fields, sort,
    ))))
}

fn c_echo(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let value = args.take_string()?;
    Ok(Built::Stream(Box::new(EchoStream::new(value))))
}

fn c_tuple(node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    let mut record = Tuple::new();
    for (name, raw) in &node.params {
        record.set(name.clone(), Scalar::parse(raw));
    }
    Ok(Built::Stream(Box::new(TupStream::new(record))))
}

// --- decorator stream constructors ---
//
// Fallible parameter parsing happens before operator arguments are taken;
// constructors that must fail after taking a child close it themselves.

fn c_sort(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let by = parse_sort_spec(required_param(node, "by")?)
        .map_err(|e| Error::construction("sort", e))?;
    let child = args.take_stream()?;
    Ok(Built::Stream(Box::new(SortStream::new(child, by))))
}

fn c_unique(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let over = required_param(node, "over")?.to_string();
    let child = args.take_stream()?;
    Ok(Built::Stream(Box::new(UniqueStream::new(child, over))))
}

fn c_top(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let n = required_param(node, "n")?
        .parse::<usize>()
        .map_err(|e| Error::construction("top", format!("bad n: {e}")))?;
    let by = parse_sort_spec(required_param(node, "sort")?)
        .map_err(|e| Error::construction("top", e))?;
    let child = args.take_stream()?;
    Ok(Built::Stream(Box::new(RankStream::new(child, n, by))))
}

fn c_merge(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let on = parse_sort_spec(required_param(node, "on")?)
        .map_err(|e| Error::construction("merge", e))?;
    let children = args.take_streams_rest()?;
    Ok(Built::Stream(Box::new(MergeStream::new(children, on))))
}

fn c_select(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let mut child = args.take_stream()?;
    let mut selections = Vec::new();
    let mut operations = Vec::new();
    while let Some((position, arg)) = args.next_arg() {
        match arg {
            BuiltArg::Value(Scalar::Str(spec)) => match Selection::parse(&spec) {
                Ok(sel) => selections.push(sel),
                Err(e) => {
                    let _ = child.close();
                    return Err(Error::construction("select", e));
                }
            },
            BuiltArg::Op(op) if op.category() == Category::Accumulator => {
                match op.into_accumulator() {
                    Ok(a) => operations.push(a),
                    Err(e) => {
                        let _ = child.close();
                        return Err(e);
                    }
                }
            }
            other => {
                let _ = child.close();
                let actual = match &other {
                    BuiltArg::Value(v) => format!("a {} value", v.type_name()),
                    BuiltArg::Op(op) => format!("a {}", op.category()),
                };
                if let BuiltArg::Op(mut op) = other {
                    let _ = op.close();
                }
                return Err(Error::TypeMismatch {
                    operator: "select".to_string(),
                    position,
                    expected: "a field selection or an operation".to_string(),
                    actual,
                });
            }
        }
    }
    Ok(Built::Stream(Box::new(SelectStream::new(
        child, selections, operations,
    ))))
}

fn c_having(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let child = args.take_stream()?;
    match args.take_operand() {
        Ok(predicate) => Ok(Built::Stream(Box::new(HavingStream::new(child, predicate)))),
        Err(e) => {
            let mut child = child;
            let _ = child.close();
            Err(e)
        }
    }
}

fn c_rollup(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let over = csv_list(required_param(node, "over")?);
    if over.is_empty() {
        return Err(Error::construction("rollup", "empty 'over' field list"));
    }
    let child = args.take_stream()?;
    match args.take_accumulators_rest() {
        Ok(metrics) => Ok(Built::Stream(Box::new(RollupStream::new(
            child, over, metrics,
        )))),
        Err(e) => {
            let mut child = child;
            let _ = child.close();
            Err(e)
        }
    }
}

fn c_hash_join(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let on = parse_join_spec(required_param(node, "on")?)
        .map_err(|e| Error::construction("hashJoin", e))?;
    let left = args.take_stream()?;
    match args.take_stream() {
        Ok(right) => Ok(Built::Stream(Box::new(HashJoinStream::new(left, right, on)))),
        Err(e) => {
            let mut left = left;
            let _ = left.close();
            Err(e)
        }
    }
}

fn c_cartesian(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let child = args.take_stream()?;
    match args.take_string() {
        Ok(field) => Ok(Built::Stream(Box::new(CartesianProductStream::new(
            child, field,
        )))),
        Err(e) => {
            let mut child = child;
            let _ = child.close();
            Err(e)
        }
    }
}

/// Parse a join spec: `"id"` or `"left_id=right_id, a=b"`.
fn parse_join_spec(spec: &str) -> std::result::Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(format!("empty join key in '{spec}'"));
        }
        match part.split_once('=') {
            None => pairs.push((part.to_string(), part.to_string())),
            Some((l, r)) => {
                let (l, r) = (l.trim(), r.trim());
                if l.is_empty() || r.is_empty() {
                    return Err(format!("unparseable join key '{part}'"));
                }
                pairs.push((l.to_string(), r.to_string()));
            }
        }
    }
    if pairs.is_empty() {
        return Err("empty join spec".to_string());
    }
    Ok(pairs)
}

// --- metric constructors ---

fn c_min(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Accumulator(Box::new(MinMetric::new(args.take_string()?))))
}

fn c_max(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Accumulator(Box::new(MaxMetric::new(args.take_string()?))))
}

fn c_sum(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Accumulator(Box::new(SumMetric::new(args.take_string()?))))
}

fn c_avg(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Accumulator(Box::new(MeanMetric::new(args.take_string()?))))
}

fn c_count(_node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    Ok(Built::Accumulator(Box::new(CountMetric::new())))
}

// --- record operation constructors ---

fn c_replace(node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let field = args.take_string()?;
    let with = Scalar::parse(required_param(node, "with")?);
    Ok(Built::Accumulator(Box::new(ReplaceOperation::new(field, with))))
}

fn c_concat(node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    let fields = csv_list(required_param(node, "fields")?);
    if fields.is_empty() {
        return Err(Error::construction("concat", "empty 'fields' list"));
    }
    let delim = node.param("delim").unwrap_or(",").to_string();
    let as_field = required_param(node, "as")?.to_string();
    Ok(Built::Accumulator(Box::new(ConcatOperation::new(
        fields, delim, as_field,
    ))))
}

// --- evaluator constructors ---

fn c_val(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(RawValueEvaluator::new(args.take_value()?))))
}

fn arith(op: ArithOp, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(ArithEvaluator::new(
        op,
        args.take_operands_rest()?,
    ))))
}

fn c_add(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    arith(ArithOp::Add, args)
}

fn c_sub(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    arith(ArithOp::Sub, args)
}

fn c_mult(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    arith(ArithOp::Mult, args)
}

fn c_div(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    arith(ArithOp::Div, args)
}

fn c_mod(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    arith(ArithOp::Mod, args)
}

fn c_pow(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    arith(ArithOp::Pow, args)
}

fn unary(op: UnaryOp, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(UnaryMathEvaluator::new(
        op,
        args.take_operand()?,
    ))))
}

fn c_abs(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    unary(UnaryOp::Abs, args)
}

fn c_round(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    unary(UnaryOp::Round, args)
}

fn c_floor(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    unary(UnaryOp::Floor, args)
}

fn c_ceil(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    unary(UnaryOp::Ceil, args)
}

fn c_sqrt(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    unary(UnaryOp::Sqrt, args)
}

fn c_and(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(AndEvaluator::new(
        args.take_operands_rest()?,
    ))))
}

fn c_or(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(OrEvaluator::new(
        args.take_operands_rest()?,
    ))))
}

fn c_not(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(NotEvaluator::new(args.take_operand()?))))
}

fn compare(op: CompareOp, args: &mut Args) -> Result<Built> {
    let left = args.take_operand()?;
    let right = args.take_operand()?;
    Ok(Built::Evaluator(Box::new(ComparisonEvaluator::new(
        op, left, right,
    ))))
}

fn c_eq(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    compare(CompareOp::Eq, args)
}

fn c_gt(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    compare(CompareOp::Gt, args)
}

fn c_gteq(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    compare(CompareOp::Gteq, args)
}

fn c_lt(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    compare(CompareOp::Lt, args)
}

fn c_lteq(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    compare(CompareOp::Lteq, args)
}

fn c_if(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    let test = args.take_operand()?;
    let then_branch = args.take_operand()?;
    let else_branch = args.take_operand()?;
    Ok(Built::Evaluator(Box::new(IfThenElseEvaluator::new(
        test,
        then_branch,
        else_branch,
    ))))
}

fn c_coalesce(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(CoalesceEvaluator::new(
        args.take_operands_rest()?,
    ))))
}

fn c_array(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(ArrayEvaluator::new(
        args.take_operands_rest()?,
    ))))
}

fn c_length(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(LengthEvaluator::new(args.take_operand()?))))
}

fn c_rev(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(ReverseEvaluator::new(args.take_operand()?))))
}

fn c_asc(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(AscEvaluator::new(args.take_operand()?))))
}

fn c_append(_node: &ExpressionNode, args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(AppendEvaluator::new(
        args.take_operands_rest()?,
    ))))
}

fn c_uuid(_node: &ExpressionNode, _args: &mut Args) -> Result<Built> {
    Ok(Built::Evaluator(Box::new(UuidEvaluator)))
}
