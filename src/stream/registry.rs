//! Stream registry and selection

use super::rest::Stream;
use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Streams a run may sync, in declaration order.
///
/// Every parent is declared before its children, so walking the registry
/// front to back never reaches a child before its parent.
#[derive(Debug, Clone)]
pub struct Registry {
    streams: Vec<Arc<dyn Stream>>,
}

impl Registry {
    /// Create a registry, validating names and parent links
    pub fn new(streams: Vec<Arc<dyn Stream>>) -> Result<Self> {
        let mut seen = HashSet::new();

        for stream in &streams {
            let name = stream.name();
            if !seen.insert(name.to_string()) {
                return Err(Error::registry(format!("duplicate stream name '{name}'")));
            }
            if let Some(parent) = &stream.definition().parent {
                if parent == name {
                    return Err(Error::registry(format!("stream '{name}' is its own parent")));
                }
                if !seen.contains(parent) {
                    return Err(Error::registry(format!(
                        "stream '{name}' must be declared after its parent '{parent}'"
                    )));
                }
            }
        }

        Ok(Self { streams })
    }

    /// All streams in declaration order
    pub fn streams(&self) -> &[Arc<dyn Stream>] {
        &self.streams
    }

    /// Stream names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name()).collect()
    }

    /// Look up a stream by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Stream>> {
        self.streams.iter().find(|s| s.name() == name)
    }

    /// Look up a stream by name, failing when it is unknown
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Stream>> {
        self.get(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// Streams without a parent
    pub fn roots(&self) -> Vec<Arc<dyn Stream>> {
        self.streams
            .iter()
            .filter(|s| s.definition().parent.is_none())
            .cloned()
            .collect()
    }

    /// Direct children of a stream
    pub fn children(&self, name: &str) -> Vec<Arc<dyn Stream>> {
        self.streams
            .iter()
            .filter(|s| s.definition().parent.as_deref() == Some(name))
            .cloned()
            .collect()
    }

    /// Parent chain of a stream, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self.get(name).and_then(|s| s.definition().parent.clone());
        while let Some(parent) = current {
            current = self.get(&parent).and_then(|s| s.definition().parent.clone());
            chain.push(parent);
        }
        chain
    }

    /// Topological order: each root followed by its descendants, depth first
    pub fn sync_order(&self) -> Vec<Arc<dyn Stream>> {
        fn visit(registry: &Registry, stream: Arc<dyn Stream>, out: &mut Vec<Arc<dyn Stream>>) {
            let children = registry.children(stream.name());
            out.push(stream);
            for child in children {
                visit(registry, child, out);
            }
        }

        let mut order = Vec::with_capacity(self.streams.len());
        for root in self.roots() {
            visit(self, root, &mut order);
        }
        order
    }

    /// Resolve a selection; unknown names are an error
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Selection> {
        let mut selection = Selection::default();

        for name in names {
            let name = name.as_ref();
            self.require(name)?;
            selection.selected.insert(name.to_string());
            selection.walked.insert(name.to_string());
            selection.walked.extend(self.ancestors(name));
        }

        Ok(selection)
    }

    /// Select every stream
    pub fn select_all(&self) -> Selection {
        let names: BTreeSet<String> = self.streams.iter().map(|s| s.name().to_string()).collect();
        Selection {
            selected: names.clone(),
            walked: names,
        }
    }
}

/// Streams chosen for a run.
///
/// A selected child implies walking its ancestors, whose records are read
/// to derive the child partitions but are not emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<String>,
    walked: BTreeSet<String>,
}

impl Selection {
    /// Whether the stream's records are emitted
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Whether the stream is synced at all
    pub fn is_walked(&self, name: &str) -> bool {
        self.walked.contains(name)
    }

    /// Selected stream names
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
