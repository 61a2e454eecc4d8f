//! Tumor ontology closure index.
//!
//! Built once per ontology load from parent → child edges. Nodes live in an
//! arena addressed by index; the descendant closure of every node is
//! precomputed so subtree membership is a set lookup at match time.

use std::collections::BTreeSet;

use ahash::AHashMap;
use tracing::info;

use oncoact_common::{MatchingConfig, OncoactError, Result};

#[derive(Debug, Clone)]
pub struct OntologyIndex {
    root: usize,
    codes: Vec<String>,
    by_code: AHashMap<String, usize>,
    children: Vec<Vec<usize>>,
    /// Strict descendants of each node.
    descendants: Vec<BTreeSet<usize>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

impl OntologyIndex {
    /// Build the index from `(parent, child)` edges. Multiple parents are
    /// allowed; cycles are rejected.
    pub fn from_edges<I, S>(root: &str, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut index = Self {
            root: 0,
            codes: Vec::new(),
            by_code: AHashMap::new(),
            children: Vec::new(),
            descendants: Vec::new(),
        };
        index.root = index.intern(root);

        for (parent, child) in edges {
            let p = index.intern(parent.as_ref());
            let c = index.intern(child.as_ref());
            if !index.children[p].contains(&c) {
                index.children[p].push(c);
            }
        }

        index.descendants = index.compute_closure()?;
        info!(nodes = index.codes.len(), root = %root, "Ontology index built");
        Ok(index)
    }

    /// Same as [`OntologyIndex::from_edges`], rooted at the configured code.
    pub fn from_config<I, S>(config: &MatchingConfig, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        Self::from_edges(&config.ontology_root_code, edges)
    }

    fn intern(&mut self, code: &str) -> usize {
        if let Some(&i) = self.by_code.get(code) {
            return i;
        }
        let i = self.codes.len();
        self.codes.push(code.to_string());
        self.children.push(Vec::new());
        self.by_code.insert(code.to_string(), i);
        i
    }

    /// Iterative post-order walk; depth is limited by heap, not thread stack.
    fn compute_closure(&self) -> Result<Vec<BTreeSet<usize>>> {
        let n = self.codes.len();
        let mut closure = vec![BTreeSet::new(); n];
        let mut state = vec![Visit::Pending; n];
        // (node, index of the next child to descend into)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..n {
            if state[start] != Visit::Pending {
                continue;
            }
            state[start] = Visit::InProgress;
            stack.push((start, 0));

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                if let Some(&child) = self.children[node].get(top.1) {
                    top.1 += 1;
                    match state[child] {
                        Visit::Pending => {
                            state[child] = Visit::InProgress;
                            stack.push((child, 0));
                        }
                        Visit::InProgress => {
                            return Err(OncoactError::Ontology(format!("cycle through code {}", self.codes[child])));
                        }
                        Visit::Done => {}
                    }
                    continue;
                }

                stack.pop();
                let mut reachable = BTreeSet::new();
                for &child in &self.children[node] {
                    reachable.insert(child);
                    reachable.extend(closure[child].iter().copied());
                }
                closure[node] = reachable;
                state[node] = Visit::Done;
            }
        }
        Ok(closure)
    }

    pub fn root(&self) -> &str {
        &self.codes[self.root]
    }

    pub fn is_root(&self, code: &str) -> bool {
        code == self.root()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Whether `code` lies in the subtree rooted at `ancestor` (inclusive).
    /// Codes unknown to the index only match themselves.
    pub fn is_in_subtree(&self, ancestor: &str, code: &str) -> bool {
        if ancestor == code {
            return true;
        }
        match (self.by_code.get(ancestor), self.by_code.get(code)) {
            (Some(&a), Some(&c)) => self.descendants[a].contains(&c),
            _ => false,
        }
    }

    /// The code itself plus every descendant, sorted.
    pub fn subtree(&self, code: &str) -> BTreeSet<String> {
        let mut codes = BTreeSet::from([code.to_string()]);
        if let Some(&i) = self.by_code.get(code) {
            codes.extend(self.descendants[i].iter().map(|&d| self.codes[d].clone()));
        }
        codes
    }
}
