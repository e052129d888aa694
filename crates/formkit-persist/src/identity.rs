//! Pass-scoped identity map between expression nodes and persisted IDs.

use std::collections::HashMap;

use formkit_core::ExprId;

/// Bidirectional `ExprId <-> persisted id` mapping for one encode or
/// decode pass.
#[derive(Debug, Default)]
pub struct IdentityMap {
    keys: HashMap<ExprId, String>,
    nodes: HashMap<String, ExprId>,
    last_id: u32,
}

impl IdentityMap {
    pub fn new() -> Self {
        IdentityMap::default()
    }

    pub fn key_of(&self, expr: ExprId) -> Option<&str> {
        self.keys.get(&expr).map(String::as_str)
    }

    pub fn node_of(&self, key: &str) -> Option<ExprId> {
        self.nodes.get(key).copied()
    }

    /// Give `expr` the next sequential ID, suffixed with its variable name
    /// when it has one: `"3"` or `"3_jButton1"`.
    pub fn assign(&mut self, expr: ExprId, variable: Option<&str>) -> String {
        self.last_id += 1;
        let key = match variable {
            Some(name) => format!("{}_{}", self.last_id, name),
            None => self.last_id.to_string(),
        };
        self.bind(key.clone(), expr);
        key
    }

    /// Record a decoded node under its persisted ID.
    pub fn bind(&mut self, key: String, expr: ExprId) {
        self.keys.insert(expr, key.clone());
        self.nodes.insert(key, expr);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.nodes.clear();
        self.last_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigned_ids_are_sequential_and_suffixed() {
        let mut map = IdentityMap::new();
        assert_eq!(map.assign(ExprId(10), None), "1");
        assert_eq!(map.assign(ExprId(11), Some("jButton1")), "2_jButton1");
        assert_eq!(map.key_of(ExprId(11)), Some("2_jButton1"));
        assert_eq!(map.node_of("1"), Some(ExprId(10)));
    }

    #[test]
    fn clear_restarts_numbering() {
        let mut map = IdentityMap::new();
        map.assign(ExprId(0), None);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.key_of(ExprId(0)), None);
        assert_eq!(map.assign(ExprId(5), None), "1");
    }
}
