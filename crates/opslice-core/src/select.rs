use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::parse::operation::Operation;

/// The operation-id value that selects every operation.
pub const WILDCARD: &str = "*";

/// Which operations a slice request keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every operation in the document.
    All,
    /// Operations whose id is in the set.
    OperationIds(HashSet<String>),
    /// Operations carrying at least one of the tags.
    Tags(HashSet<String>),
}

impl Selector {
    /// Build a selector from the two comma-separated filters of a request.
    /// Exactly one of them must be present.
    pub fn from_filters(
        operation_ids: Option<&str>,
        tags: Option<&str>,
    ) -> Result<Self, RequestError> {
        match (operation_ids, tags) {
            (Some(_), Some(_)) => Err(RequestError::SelectorConflict),
            (None, None) => Err(RequestError::SelectorMissing),
            (Some(ids), None) if ids.trim() == WILDCARD => Ok(Selector::All),
            (Some(ids), None) => Ok(Selector::OperationIds(split_list(ids))),
            (None, Some(tags)) => Ok(Selector::Tags(split_list(tags))),
        }
    }

    pub fn matches(&self, operation: &Operation) -> bool {
        match self {
            Selector::All => true,
            Selector::OperationIds(ids) => operation
                .operation_id
                .as_deref()
                .is_some_and(|id| ids.contains(id)),
            Selector::Tags(tags) => operation.tags.iter().any(|t| tags.contains(t)),
        }
    }
}

fn split_list(list: &str) -> HashSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// How the sliced document is shaped for its consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Plain,
    Powershell,
    PowerPlatform,
}

impl Style {
    /// Whether consumers of this style need `anyOf` unions collapsed.
    pub fn restricts_unions(&self) -> bool {
        matches!(self, Style::Powershell | Style::PowerPlatform)
    }
}
