//! Filter compilation against the declared todo schema

mod common;

use common::compile_filter;
use serde_json::json;
use todo_core::filter::{
    ComparisonOperator, ConjunctionKind, FilterCompiler, FilterNode, JoinKind, JoinPlanner,
    PredicateTree, QualifiedColumn,
};
use todo_core::TodoError;

#[test]
fn test_name_and_assignee_email_compile_with_one_join() {
    let (predicate, planner) = compile_filter(
        "Todo",
        json!({
            "name": { "_contains": "Carlos" },
            "assignee": { "email": { "_eq": "a@b.com" } }
        }),
    )
    .unwrap();

    assert_eq!(predicate.to_string(), "AND[name LIKE %Carlos%, e1.email = a@b.com]");

    let joins = planner.joins();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].relation_path, "assignee");
    assert_eq!(joins[0].alias, "e1");
    assert_eq!(joins[0].kind, JoinKind::LeftJoin);
    assert_eq!(joins[0].parent_alias, None);
}

#[test]
fn test_contains_wraps_and_eq_passes_through() {
    let (predicate, _) = compile_filter(
        "Todo",
        json!({ "name": { "_contains": "milk" }, "description": { "_eq": "two liters" } }),
    )
    .unwrap();

    let comparisons = predicate.comparisons();
    let PredicateTree::Comparison {
        operator, operand, ..
    } = comparisons[0]
    else {
        panic!("expected comparison");
    };
    assert_eq!(*operator, ComparisonOperator::Like);
    assert_eq!(operand, &json!("%milk%"));

    let PredicateTree::Comparison {
        operator, operand, ..
    } = comparisons[1]
    else {
        panic!("expected comparison");
    };
    assert_eq!(*operator, ComparisonOperator::Eq);
    assert_eq!(operand, &json!("two liters"));
}

#[test]
fn test_or_with_two_relation_branches_shares_alias() {
    let registry = common::registry();
    let tree = FilterNode::or(vec![
        FilterNode::relation("assignee", FilterNode::compare("email", "_eq", "a@b.com")),
        FilterNode::relation("assignee", FilterNode::compare("name", "_contains", "Carlos")),
    ]);
    let mut planner = JoinPlanner::new();

    let predicate = FilterCompiler::new(&registry)
        .compile("Todo", &tree, &mut planner)
        .unwrap();

    assert_eq!(planner.len(), 1);
    assert_eq!(predicate.to_string(), "OR[e1.email = a@b.com, e1.name LIKE %Carlos%]");
    let PredicateTree::Conjunction { kind, children } = &predicate else {
        panic!("expected conjunction");
    };
    assert_eq!(*kind, ConjunctionKind::Or);
    assert_eq!(children.len(), 2);
}

#[test]
fn test_relation_inside_or_group_reuses_outer_alias() {
    let (predicate, planner) = compile_filter(
        "Todo",
        json!({
            "assignee": { "email": { "_eq": "a@b.com" } },
            "_or": {
                "name": { "_contains": "urgent" },
                "assignee": { "name": { "_eq": "Carlos" } }
            }
        }),
    )
    .unwrap();

    assert_eq!(planner.len(), 1);
    assert_eq!(
        predicate.to_string(),
        "AND[e1.email = a@b.com, OR[name LIKE %urgent%, e1.name = Carlos]]"
    );
}

#[test]
fn test_nested_relations_get_distinct_aliases() {
    let (predicate, planner) = compile_filter(
        "Todo",
        json!({ "assignee": { "todos": { "name": { "_eq": "Other" } } } }),
    )
    .unwrap();

    let joins = planner.joins();
    assert_eq!(joins.len(), 2);
    assert_eq!(joins[1].relation_path, "todos");
    assert_eq!(joins[1].parent_alias.as_deref(), Some("e1"));

    let comparisons = predicate.comparisons();
    let PredicateTree::Comparison { column, .. } = comparisons[0] else {
        panic!("expected comparison");
    };
    assert_eq!(column, &QualifiedColumn::aliased("e2", "name"));
}

#[test]
fn test_unknown_field_names_field_and_entity() {
    let err = compile_filter("Todo", json!({ "priority": { "_eq": 1 } })).unwrap_err();
    assert_eq!(err, TodoError::unknown_field("Todo", "priority"));
    assert_eq!(err.to_string(), "priority field not found in Todo entity");

    let err = compile_filter("Todo", json!({ "assignee": { "phone": { "_eq": "1" } } }))
        .unwrap_err();
    assert_eq!(err, TodoError::unknown_field("User", "phone"));
}

#[test]
fn test_unknown_operator_is_rejected() {
    let err = compile_filter("Todo", json!({ "name": { "_regex": "^a" } })).unwrap_err();
    assert!(matches!(err, TodoError::UnknownOperator { ref operator, .. } if operator == "_regex"));
}

#[test]
fn test_filter_on_user_root() {
    let (predicate, planner) = compile_filter(
        "User",
        json!({ "todos": { "name": { "_contains": "milk" } }, "email": { "_neq": "x@y.com" } }),
    )
    .unwrap();

    assert_eq!(planner.joins()[0].relation_path, "todos");
    assert_eq!(predicate.to_string(), "AND[e1.name LIKE %milk%, email <> x@y.com]");
}

#[test]
fn test_unknown_entity_is_a_server_error() {
    let err = compile_filter("Project", json!({ "name": { "_eq": "x" } })).unwrap_err();
    assert_eq!(err, TodoError::UnknownEntity("Project".to_string()));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_parser_and_compiler_agree_on_depth() {
    let registry = common::registry();
    let filters = [
        json!({ "name": { "_gte": "a", "_lte": "b" } }),
        json!({ "assignee": { "name": { "_gte": "a", "_lte": "b" } } }),
        json!({ "_or": { "name": { "_eq": "a" }, "description": { "_neq": "b", "_contains": "c" } } }),
        json!({ "assignee": { "todos": { "name": { "_eq": "x" } } } }),
        json!({ "_and": { "_and": {} } }),
    ];

    for filter in &filters {
        for max_depth in 1..=4 {
            let parsed = todo_core::filter::wire::parse_filter_with_depth(filter, max_depth);
            let compiled = parsed.clone().and_then(|tree| {
                FilterCompiler::new(&registry)
                    .with_max_depth(max_depth)
                    .compile("Todo", &tree, &mut JoinPlanner::new())
            });
            assert_eq!(
                parsed.is_ok(),
                compiled.is_ok(),
                "{filter} at max depth {max_depth}: {compiled:?}"
            );
        }
    }
}
