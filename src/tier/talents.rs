//! Talent prerequisite graph
//!
//! Built by inverting the `RequiredTalents` lists of `D_Talents`. The data is
//! meant to be a DAG but self references and cycles show up, so every walk
//! keeps a visited set.

use std::collections::{HashMap, HashSet, VecDeque};

use super::anchors::Anchor;
use crate::source::SourceRow;

/// Prefixes stripped from a talent's unlocked item id
const UNLOCK_PREFIXES: &[&str] = &["Item_", "Kit_"];

#[derive(Debug, Default, Clone)]
pub struct TalentGraph {
    /// talent -> talents that require it
    children: HashMap<String, Vec<String>>,
    /// talent -> its direct prerequisites
    parents: HashMap<String, Vec<String>>,
    /// talent or unlocked item -> talent id
    unlocks: HashMap<String, String>,
}

impl TalentGraph {
    pub fn from_rows(rows: &[SourceRow]) -> Self {
        let mut graph = Self::default();

        for row in rows {
            let name = row.name();
            if name.is_empty() {
                continue;
            }
            let prerequisites: Vec<String> = row
                .row_refs("RequiredTalents")
                .into_iter()
                .map(str::to_string)
                .collect();

            for prerequisite in &prerequisites {
                graph
                    .children
                    .entry(prerequisite.clone())
                    .or_default()
                    .push(name.to_string());
            }
            graph.parents.insert(name.to_string(), prerequisites);

            graph.unlocks.insert(name.to_string(), name.to_string());
            if let Some(item) = row.row_ref("ExtraData") {
                graph
                    .unlocks
                    .insert(strip_unlock_prefixes(item), name.to_string());
            }
        }

        graph
    }

    /// Talent that unlocks a bench or item, if any
    pub fn unlocking_talent(&self, item: &str) -> Option<&str> {
        self.unlocks.get(item).map(String::as_str)
    }

    pub fn parents(&self, talent: &str) -> &[String] {
        self.parents.get(talent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children(&self, talent: &str) -> &[String] {
        self.children.get(talent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Lowest-ranked anchor reachable upward from `talent` (itself included)
    ///
    /// Stops early once the baseline anchor is found.
    pub fn nearest_anchor(&self, talent: &str) -> Option<Anchor> {
        let mut queue = VecDeque::from([talent]);
        let mut visited = HashSet::from([talent]);
        let mut best: Option<Anchor> = None;

        while let Some(current) = queue.pop_front() {
            if let Some(anchor) = Anchor::from_name(current) {
                if best.map_or(true, |b| anchor.rank() < b.rank()) {
                    best = Some(anchor);
                }
                if anchor == Anchor::Character {
                    break;
                }
            }

            for parent in self.parents(current) {
                if visited.insert(parent.as_str()) {
                    queue.push_back(parent.as_str());
                }
            }
        }

        best
    }

    /// Edge count from `from` down to `to` along dependents, if reachable
    pub fn distance(&self, from: &str, to: &str) -> Option<u32> {
        if from == to {
            return Some(0);
        }

        let mut queue = VecDeque::from([(from, 0u32)]);
        let mut visited = HashSet::from([from]);

        while let Some((current, dist)) = queue.pop_front() {
            if current == to {
                return Some(dist);
            }
            for child in self.children(current) {
                if visited.insert(child.as_str()) {
                    queue.push_back((child.as_str(), dist + 1));
                }
            }
        }

        None
    }
}

/// Removes every prefix occurrence, not only a leading one
fn strip_unlock_prefixes(item: &str) -> String {
    UNLOCK_PREFIXES
        .iter()
        .fold(item.to_string(), |acc, prefix| acc.replace(prefix, ""))
}
