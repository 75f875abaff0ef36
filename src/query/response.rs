//! Query response record

use std::collections::BTreeMap;

use serde::Serialize;

/// Merged result of the data, count and expand queries of one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse<R, C> {
    pub value: R,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<C>,

    /// Present only when at least one relation was expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand: Option<BTreeMap<String, R>>,
}

impl<R, C> QueryResponse<R, C> {
    pub fn new(value: R) -> Self {
        Self {
            value,
            count: None,
            expand: None,
        }
    }

    /// Attach the rows of one expanded relation
    pub fn insert_expand(&mut self, relation: impl Into<String>, rows: R) {
        self.expand
            .get_or_insert_with(BTreeMap::new)
            .insert(relation.into(), rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_only_present_parts() {
        let response: QueryResponse<Vec<u32>, u64> = QueryResponse::new(vec![1, 2]);
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"value": [1, 2]}));
    }

    #[test]
    fn test_expand_map_created_on_first_insert() {
        let mut response: QueryResponse<Vec<u32>, u64> = QueryResponse::new(vec![]);
        response.count = Some(4);
        response.insert_expand("orders", vec![7]);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"value": [], "count": 4, "expand": {"orders": [7]}})
        );
    }
}
