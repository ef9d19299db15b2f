//! Join alias allocation shared by the filter and order compilers.

use crate::constants::aliases::JOIN_PREFIX;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JoinKind {
    LeftJoin,
    InnerJoin,
}

/// One planned join: relation `relation_path` of the scope `parent_alias`
/// (the root entity when `None`) joined under `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    pub relation_path: String,
    pub alias: String,
    pub kind: JoinKind,
    pub parent_alias: Option<String>,
}

/// Per-request join planner.
///
/// At most one join exists per `(parent_alias, relation_field)`; entries are
/// never removed and keep first-seen order.
#[derive(Debug, Default)]
pub struct JoinPlanner {
    joins: Vec<JoinConfig>,
    index: HashMap<(Option<String>, String), usize>,
}

impl JoinPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for `relation_field` under `parent_alias`, allocating a left join on first use
    pub fn resolve(&mut self, parent_alias: Option<&str>, relation_field: &str) -> String {
        let key = (parent_alias.map(str::to_string), relation_field.to_string());
        if let Some(&position) = self.index.get(&key) {
            return self.joins[position].alias.clone();
        }

        let alias = format!("{JOIN_PREFIX}{}", self.joins.len() + 1);
        tracing::trace!(
            parent_alias = ?parent_alias,
            relation = %relation_field,
            alias = %alias,
            "allocated join alias"
        );
        self.index.insert(key, self.joins.len());
        self.joins.push(JoinConfig {
            relation_path: relation_field.to_string(),
            alias: alias.clone(),
            kind: JoinKind::LeftJoin,
            parent_alias: parent_alias.map(str::to_string),
        });
        alias
    }

    pub fn joins(&self) -> &[JoinConfig] {
        &self.joins
    }

    pub fn into_joins(self) -> Vec<JoinConfig> {
        self.joins
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}
