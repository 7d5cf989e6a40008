//! End-to-end pipeline behavior through the in-memory backend.

mod test_support;

use rivulet_core::expr::ExpressionNode;
use rivulet_core::tuple::{Scalar, Tuple};
use rivulet_io::MemoryBackend;
use rivulet_lang::{drive, OperatorFactory};

use test_support::{bootstrap, context, people_backend, search};

fn run(backend: &MemoryBackend, expr: &ExpressionNode) -> Vec<Tuple> {
    let registry = bootstrap();
    let factory = OperatorFactory::new(&registry);
    let mut root = factory.construct(expr).unwrap().into_stream().unwrap();
    let ctx = context(backend);
    let records = drive(root.as_mut(), &ctx).unwrap();
    assert_eq!(backend.open_cursors(), 0, "cursor leaked after drive");
    records
}

fn ids(records: &[Tuple]) -> Vec<i64> {
    records
        .iter()
        .map(|t| t.value_of("id").as_i64().unwrap())
        .collect()
}

#[test]
fn sort_unique_search_dedups_then_orders_by_score() {
    let backend = people_backend();
    // sort(unique(search(people, q="*:*", sort="id asc"), over="id"), by="score desc")
    let expr = ExpressionNode::call("sort")
        .with_expr(
            ExpressionNode::call("unique")
                .with_expr(search("people", "id asc"))
                .with_param("over", "id"),
        )
        .with_param("by", "score desc");

    let records = run(&backend, &expr);
    // id 2 appears twice in the collection; dedup keeps the first (score 4.0)
    assert_eq!(ids(&records), vec![1, 3, 2, 4]);
    let scores: Vec<f64> = records
        .iter()
        .map(|t| t.value_of("score").as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn merge_orders_by_the_declared_key_not_arrival() {
    let backend = MemoryBackend::new();
    backend.insert(
        "evens",
        vec![
            Tuple::from_pairs([("id", Scalar::I64(2))]),
            Tuple::from_pairs([("id", Scalar::I64(4))]),
            Tuple::from_pairs([("id", Scalar::I64(6))]),
        ],
    );
    backend.insert(
        "odds",
        vec![
            Tuple::from_pairs([("id", Scalar::I64(1))]),
            Tuple::from_pairs([("id", Scalar::I64(3))]),
            Tuple::from_pairs([("id", Scalar::I64(5))]),
        ],
    );

    let expr = ExpressionNode::call("merge")
        .with_expr(search("evens", "id asc"))
        .with_expr(search("odds", "id asc"))
        .with_param("on", "id asc");

    assert_eq!(ids(&run(&backend, &expr)), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn top_keeps_the_best_records_under_the_sort_key() {
    let backend = people_backend();
    let expr = ExpressionNode::call("top")
        .with_expr(search("people", "id asc"))
        .with_param("n", "2")
        .with_param("sort", "score desc");

    let records = run(&backend, &expr);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value_of("score"), Scalar::F64(9.0));
    assert_eq!(records[1].value_of("score"), Scalar::F64(7.5));
}

#[test]
fn having_filters_on_a_boolean_evaluator() {
    let backend = people_backend();
    // having(search(...), gt(score, 5.0))
    let expr = ExpressionNode::call("having")
        .with_expr(search("people", "id asc"))
        .with_expr(
            ExpressionNode::call("gt")
                .with_value("score")
                .with_value(5.0f64),
        );

    let records = run(&backend, &expr);
    assert_eq!(ids(&records), vec![1, 2, 3]);
    assert!(records
        .iter()
        .all(|t| t.value_of("score").as_f64().unwrap() > 5.0));
}

#[test]
fn rollup_groups_a_sorted_stream_and_resets_between_keys() {
    let backend = MemoryBackend::new();
    let sale = |region: &str, amount: i64| {
        Tuple::from_pairs([
            ("region", Scalar::Str(region.to_string())),
            ("amount", Scalar::I64(amount)),
        ])
    };
    backend.insert(
        "sales",
        vec![
            sale("east", 10),
            sale("east", 20),
            sale("north", 5),
            sale("west", 1),
            sale("west", 2),
            sale("west", 3),
        ],
    );

    // rollup(search(sales, sort="region asc"), over="region", sum(amount), count())
    let expr = ExpressionNode::call("rollup")
        .with_expr(search("sales", "region asc"))
        .with_expr(ExpressionNode::call("sum").with_value("amount"))
        .with_expr(ExpressionNode::call("count"))
        .with_param("over", "region");

    let records = run(&backend, &expr);
    assert_eq!(records.len(), 3);

    let by_region: Vec<(String, i64, i64)> = records
        .iter()
        .map(|t| {
            (
                t.value_of("region").to_string(),
                t.value_of("sum(amount)").as_i64().unwrap(),
                t.value_of("count(*)").as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        by_region,
        vec![
            ("east".to_string(), 30, 2),
            ("north".to_string(), 5, 1),
            ("west".to_string(), 6, 3),
        ]
    );
}

#[test]
fn select_projects_renames_and_applies_operations() {
    let backend = MemoryBackend::new();
    backend.insert(
        "users",
        vec![
            Tuple::from_pairs([
                ("first", Scalar::Str("ada".into())),
                ("last", Scalar::Str("l".into())),
                ("flag", Scalar::Null),
            ]),
        ],
    );

    // select(search(users), "full as name", concat(...), replace(flag, with=false))
    let expr = ExpressionNode::call("select")
        .with_expr(search("users", "first asc"))
        .with_value("full as name")
        .with_value("flag")
        .with_expr(
            ExpressionNode::call("concat")
                .with_param("fields", "first,last")
                .with_param("delim", " ")
                .with_param("as", "full"),
        )
        .with_expr(
            ExpressionNode::call("replace")
                .with_value("flag")
                .with_param("with", "false"),
        );

    let records = run(&backend, &expr);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value_of("name"), Scalar::Str("ada l".into()));
    assert_eq!(records[0].value_of("flag"), Scalar::Bool(false));
    assert_eq!(records[0].get("first"), None, "unselected field survived");
}

#[test]
fn hash_join_merges_matching_records() {
    let backend = MemoryBackend::new();
    backend.insert(
        "orders",
        vec![
            Tuple::from_pairs([("user_id", Scalar::I64(1)), ("total", Scalar::I64(30))]),
            Tuple::from_pairs([("user_id", Scalar::I64(2)), ("total", Scalar::I64(40))]),
            Tuple::from_pairs([("user_id", Scalar::I64(9)), ("total", Scalar::I64(50))]),
        ],
    );
    backend.insert(
        "users",
        vec![
            Tuple::from_pairs([("id", Scalar::I64(1)), ("name", Scalar::Str("ada".into()))]),
            Tuple::from_pairs([("id", Scalar::I64(2)), ("name", Scalar::Str("bo".into()))]),
        ],
    );

    // hashJoin(search(orders), search(users), on="user_id=id")
    let expr = ExpressionNode::call("hashJoin")
        .with_expr(search("orders", "user_id asc"))
        .with_expr(search("users", "id asc"))
        .with_param("on", "user_id=id");

    let records = run(&backend, &expr);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value_of("name"), Scalar::Str("ada".into()));
    assert_eq!(records[0].value_of("total"), Scalar::I64(30));
    assert_eq!(records[1].value_of("name"), Scalar::Str("bo".into()));
}

#[test]
fn cartesian_product_expands_list_fields() {
    let backend = MemoryBackend::new();
    backend.insert(
        "contacts",
        vec![Tuple::from_pairs([
            ("id", Scalar::I64(1)),
            (
                "emails",
                Scalar::List(vec![
                    Scalar::Str("a@x".into()),
                    Scalar::Str("b@x".into()),
                ]),
            ),
        ])],
    );

    let expr = ExpressionNode::call("cartesianProduct")
        .with_expr(search("contacts", "id asc"))
        .with_value("emails");

    let records = run(&backend, &expr);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value_of("emails"), Scalar::Str("a@x".into()));
    assert_eq!(records[1].value_of("emails"), Scalar::Str("b@x".into()));
}

#[test]
fn tuple_and_echo_sources_emit_single_records() {
    let backend = MemoryBackend::new();

    let expr = ExpressionNode::call("tuple")
        .with_param("id", "7")
        .with_param("name", "ada");
    let records = run(&backend, &expr);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value_of("id"), Scalar::I64(7));
    assert_eq!(records[0].value_of("name"), Scalar::Str("ada".into()));

    let expr = ExpressionNode::call("echo").with_value("hello");
    let records = run(&backend, &expr);
    assert_eq!(records[0].value_of("echo"), Scalar::Str("hello".into()));
}
