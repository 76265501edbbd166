//! The Local Store: the last-fetched snapshot of classes, members and history, plus the pure
//! functions that derive filtered views from a snapshot without touching it.

use crate::model::{format_tanggal, HistoryPage, Member, Summary, Transaction, TypeFilter};
use std::collections::HashSet;
use tracing::warn;

/// The in-memory snapshot the views are rendered from.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct LocalStore {
    classes: Vec<String>,
    members: Vec<Member>,
    history: Vec<Transaction>,
    summary: Option<Summary>,
    snapshot: u64,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn summary(&self) -> Option<Summary> {
        self.summary
    }

    /// Counts history reloads. Changes each time `set_history` replaces the snapshot.
    pub fn snapshot(&self) -> u64 {
        self.snapshot
    }

    pub fn set_classes(&mut self, classes: Vec<String>) {
        self.classes = classes;
    }

    pub fn set_members(&mut self, members: Vec<Member>) {
        self.members = members;
    }

    /// Replaces the history with a freshly fetched page. Ids must be unique within a snapshot, so
    /// later rows repeating an id are dropped.
    pub fn set_history(&mut self, page: HistoryPage) {
        let mut seen = HashSet::new();
        let mut history = Vec::with_capacity(page.transactions.len());
        for t in page.transactions {
            if seen.insert(t.id.clone()) {
                history.push(t);
            } else {
                warn!("Dropping history entry with duplicate id '{}'", t.id);
            }
        }
        self.history = history;
        self.snapshot += 1;
        if page.summary.is_some() {
            self.summary = page.summary;
        }
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.history.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.history.iter().position(|t| t.id == id)
    }

    pub(crate) fn history_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.history
    }
}

/// Members whose `kelas` is exactly `class_label`, or all of them when the label is empty.
pub fn filter_by_class(snapshot: &[Member], class_label: &str) -> Vec<Member> {
    if class_label.is_empty() {
        return snapshot.to_vec();
    }
    snapshot
        .iter()
        .filter(|m| m.kelas == class_label)
        .cloned()
        .collect()
}

/// Members whose `nama` or `nim` contains `term`, ignoring case. The empty term matches all.
pub fn search_members(snapshot: &[Member], term: &str) -> Vec<Member> {
    if term.is_empty() {
        return snapshot.to_vec();
    }
    let term = term.to_lowercase();
    snapshot
        .iter()
        .filter(|m| m.nama.to_lowercase().contains(&term) || m.nim.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// History entries of the filtered type whose title, subtitle or displayed date contains `term`,
/// ignoring case.
pub fn filter_history(snapshot: &[Transaction], filter: TypeFilter, term: &str) -> Vec<Transaction> {
    let term = term.to_lowercase();
    snapshot
        .iter()
        .filter(|t| filter.matches(t.kind))
        .filter(|t| {
            term.is_empty()
                || t.title.to_lowercase().contains(&term)
                || t.subtitle.to_lowercase().contains(&term)
                || format_tanggal(&t.date).to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}
