use proptest::prelude::*;
use serde_json::{json, Value};

/// Scalar fields of Todo with a wire operator valid for them
pub fn todo_condition_strategy() -> impl Strategy<Value = (String, Value)> {
    let text = "[a-zA-Z0-9 @.]{0,20}";
    prop_oneof![
        text.prop_map(|s| ("name".to_string(), json!({ "_contains": s }))),
        text.prop_map(|s| ("name".to_string(), json!({ "_eq": s }))),
        text.prop_map(|s| ("description".to_string(), json!({ "_ilike": s }))),
        text.prop_map(|s| ("createdAt".to_string(), json!({ "_gte": s }))),
    ]
}

/// Conditions on the assigned user, reached through the `assignee` relation
pub fn user_condition_strategy() -> impl Strategy<Value = (String, Value)> {
    let text = "[a-z]{1,10}@[a-z]{1,8}\\.com";
    prop_oneof![
        text.prop_map(|s| ("email".to_string(), json!({ "_eq": s }))),
        text.prop_map(|s| ("name".to_string(), json!({ "_contains": s }))),
    ]
}

/// Object keyed by unique field names
pub fn object_of(entries: Vec<(String, Value)>) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in entries {
        map.entry(key).or_insert(value);
    }
    Value::Object(map)
}

/// Scalar-only Todo filter document
pub fn scalar_filter_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(todo_condition_strategy(), 1..4).prop_map(object_of)
}

/// Todo filter that touches the `assignee` relation from several branches
pub fn relation_branches_strategy() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(user_condition_strategy(), 1..3),
        prop::collection::vec(user_condition_strategy(), 1..3),
        prop::collection::vec(todo_condition_strategy(), 0..3),
    )
        .prop_map(|(first, second, scalars)| {
            let mut filter = object_of(scalars);
            if let Value::Object(map) = &mut filter {
                map.insert("assignee".to_string(), object_of(first));
                map.insert(
                    "_or".to_string(),
                    json!({ "assignee": object_of(second) }),
                );
            }
            filter
        })
}
