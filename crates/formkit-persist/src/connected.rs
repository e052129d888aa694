//! Connected-property resolver.
//!
//! Connected properties are collected while components load and applied
//! once the whole component tree exists. An entry whose reference reads
//! another entry's property depends on it and is applied after it; cycles
//! fall back to SCC levels (see [`crate::order`]). Every entry is applied
//! exactly once and a failed write never stops the batch.

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::debug;

use formkit_core::{DesignReference, FormModel, PropertyKey, PropertyValue, Value};

use crate::error::{LoadPath, NonFatalError};
use crate::order::{dependency_order, TopologicalOrder};

/// Failure to read or write one connected value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("no component named '{0}'")]
    UnknownComponent(String),

    #[error("component '{component}' has no property '{property}'")]
    UnknownProperty { component: String, property: String },
}

/// Where connected values are read from and written to.
pub trait ConnectedTarget {
    /// The current value the reference observes; `None` when it reads
    /// nothing the model can evaluate.
    fn read_source(&self, reference: &DesignReference) -> Result<Option<Value>, ApplyError>;

    /// Store the connected property with its resolved value. The property
    /// must already exist on the component.
    fn write_connected(
        &mut self,
        key: &PropertyKey,
        reference: DesignReference,
        resolved: Option<Value>,
    ) -> Result<(), ApplyError>;
}

/// One deferred connected property.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedPropertyEntry {
    pub key: PropertyKey,
    pub reference: DesignReference,
    /// Where the property was read, for error messages.
    pub path: LoadPath,
}

/// The batch of connected properties of one load pass.
#[derive(Debug, Default)]
pub struct ConnectedProperties {
    entries: IndexMap<PropertyKey, ConnectedPropertyEntry>,
}

impl ConnectedProperties {
    pub fn new() -> Self {
        ConnectedProperties::default()
    }

    /// Add an entry; a later entry for the same key replaces the earlier.
    pub fn put(&mut self, key: PropertyKey, reference: DesignReference, path: LoadPath) {
        self.entries.insert(
            key.clone(),
            ConnectedPropertyEntry {
                key,
                reference,
                path,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&ConnectedPropertyEntry> {
        self.entries.get(key)
    }

    /// Graph over entry positions with an edge from each entry to the entry
    /// its reference reads.
    pub fn dependency_graph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::with_capacity(self.entries.len(), self.entries.len());
        let nodes: Vec<NodeIndex> = (0..self.entries.len()).map(|i| graph.add_node(i)).collect();
        for (i, entry) in self.entries.values().enumerate() {
            let source = entry
                .reference
                .source_key()
                .and_then(|key| self.entries.get_index_of(&key));
            if let Some(j) = source {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
        graph
    }

    /// Entry positions in application order.
    pub fn apply_order(&self) -> TopologicalOrder {
        dependency_order(&self.dependency_graph())
    }

    /// Apply every entry to `target`, returning the failed writes.
    pub fn resolve<T: ConnectedTarget + ?Sized>(self, target: &mut T) -> Vec<NonFatalError> {
        let graph = self.dependency_graph();
        let order = dependency_order(&graph);
        if order.is_cyclic() {
            debug!(entries = self.entries.len(), "connected properties form a cycle");
        }

        let mut slots: Vec<Option<ConnectedPropertyEntry>> =
            self.entries.into_values().map(Some).collect();
        let mut errors = Vec::new();
        for node in order.into_sequence() {
            let Some(entry) = slots.get_mut(graph[node]).and_then(Option::take) else {
                continue;
            };
            let result = target
                .read_source(&entry.reference)
                .and_then(|value| target.write_connected(&entry.key, entry.reference, value));
            if let Err(err) = result {
                errors.push(NonFatalError {
                    path: entry.path,
                    message: format!("cannot set connected value of {}: {}", entry.key, err),
                });
            }
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// FormModel as target
// ---------------------------------------------------------------------------

fn property_value(form: &FormModel, key: &PropertyKey) -> Result<Option<Value>, ApplyError> {
    let component = form
        .components
        .by_name(&key.component)
        .ok_or_else(|| ApplyError::UnknownComponent(key.component.clone()))?;
    Ok(component
        .properties
        .get(&key.property)
        .and_then(PropertyValue::current)
        .cloned())
}

impl ConnectedTarget for FormModel {
    fn read_source(&self, reference: &DesignReference) -> Result<Option<Value>, ApplyError> {
        if let Some(component) = &reference.component {
            if self.components.by_name(component).is_none() {
                return Err(ApplyError::UnknownComponent(component.clone()));
            }
        }
        match reference.source_key() {
            Some(key) => property_value(self, &key),
            None => Ok(None),
        }
    }

    fn write_connected(
        &mut self,
        key: &PropertyKey,
        reference: DesignReference,
        resolved: Option<Value>,
    ) -> Result<(), ApplyError> {
        let id = self
            .components
            .id_of(&key.component)
            .ok_or_else(|| ApplyError::UnknownComponent(key.component.clone()))?;
        let unknown_property = || ApplyError::UnknownProperty {
            component: key.component.clone(),
            property: key.property.clone(),
        };
        let ty = self
            .components
            .get(id)
            .ok()
            .and_then(|c| c.properties.get(&key.property))
            .map(|p| p.ty().clone())
            .ok_or_else(unknown_property)?;
        self.set_property(
            id,
            &key.property,
            PropertyValue::Connected {
                ty,
                reference,
                resolved,
            },
        )
        .map_err(|_| unknown_property())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Records the order of writes; values are the number of writes so far.
    #[derive(Default)]
    struct Recorder {
        values: HashMap<PropertyKey, Value>,
        writes: Vec<PropertyKey>,
        fail_on: Option<PropertyKey>,
    }

    impl ConnectedTarget for Recorder {
        fn read_source(&self, reference: &DesignReference) -> Result<Option<Value>, ApplyError> {
            Ok(reference.source_key().and_then(|k| self.values.get(&k).cloned()))
        }

        fn write_connected(
            &mut self,
            key: &PropertyKey,
            _reference: DesignReference,
            resolved: Option<Value>,
        ) -> Result<(), ApplyError> {
            if self.fail_on.as_ref() == Some(key) {
                return Err(ApplyError::UnknownProperty {
                    component: key.component.clone(),
                    property: key.property.clone(),
                });
            }
            self.writes.push(key.clone());
            self.values
                .insert(key.clone(), resolved.unwrap_or(Value::Int(self.writes.len() as i64)));
            Ok(())
        }
    }

    fn key(component: &str, property: &str) -> PropertyKey {
        PropertyKey::new(component, property)
    }

    fn entry(batch: &mut ConnectedProperties, target: PropertyKey, source: PropertyKey) {
        let path = LoadPath::root()
            .component(&target.component)
            .property(&target.property);
        batch.put(
            target,
            DesignReference::property(source.component, source.property),
            path,
        );
    }

    #[test]
    fn dependency_is_applied_first() {
        let mut batch = ConnectedProperties::new();
        // P1 on X reads P2 on Y; P2 reads a plain property of Z.
        entry(&mut batch, key("x", "p1"), key("y", "p2"));
        entry(&mut batch, key("y", "p2"), key("z", "plain"));

        let mut recorder = Recorder::default();
        let errors = batch.resolve(&mut recorder);
        assert!(errors.is_empty());
        assert_eq!(recorder.writes, vec![key("y", "p2"), key("x", "p1")]);
        // P1 observed the value written for P2.
        assert_eq!(recorder.values[&key("x", "p1")], Value::Int(1));
    }

    #[test]
    fn two_cycle_applies_each_entry_once() {
        let mut batch = ConnectedProperties::new();
        entry(&mut batch, key("x", "p1"), key("y", "p2"));
        entry(&mut batch, key("y", "p2"), key("x", "p1"));
        assert!(batch.apply_order().is_cyclic());

        let mut recorder = Recorder::default();
        let errors = batch.resolve(&mut recorder);
        assert!(errors.is_empty());
        assert_eq!(recorder.writes.len(), 2);
        assert!(recorder.writes.contains(&key("x", "p1")));
        assert!(recorder.writes.contains(&key("y", "p2")));
    }

    #[test]
    fn failed_write_is_collected_and_batch_continues() {
        let mut batch = ConnectedProperties::new();
        entry(&mut batch, key("a", "text"), key("b", "text"));
        entry(&mut batch, key("c", "text"), key("d", "text"));

        let mut recorder = Recorder {
            fail_on: Some(key("a", "text")),
            ..Recorder::default()
        };
        let errors = batch.resolve(&mut recorder);
        assert_eq!(recorder.writes, vec![key("c", "text")]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "Form -> a -> Property text");
        assert!(errors[0].message.contains("[a, text]"));
    }

    #[test]
    fn later_put_replaces_entry() {
        let mut batch = ConnectedProperties::new();
        entry(&mut batch, key("a", "text"), key("b", "text"));
        entry(&mut batch, key("a", "text"), key("c", "text"));
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.get(&key("a", "text")).unwrap().reference.source_key(),
            Some(key("c", "text"))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn every_entry_applied_exactly_once(
            edges in prop::collection::vec((0usize..8, 0usize..8), 0..24)
        ) {
            let mut batch = ConnectedProperties::new();
            let mut targets = Vec::new();
            for (from, to) in &edges {
                let target = key(&format!("c{}", from), "p");
                entry(&mut batch, target.clone(), key(&format!("c{}", to), "p"));
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
            let mut recorder = Recorder::default();
            let errors = batch.resolve(&mut recorder);
            prop_assert!(errors.is_empty());
            prop_assert_eq!(recorder.writes.len(), targets.len());
            for target in &targets {
                prop_assert_eq!(recorder.writes.iter().filter(|w| *w == target).count(), 1);
            }
        }
    }
}
