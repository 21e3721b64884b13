//! In-process copy of the records the dashboard shows.
//!
//! The cache keeps the full list and the currently displayed result list
//! apart, so a search can narrow the table without losing the full list.
//! Only request-completion code in `services::dashboard` writes to it. When
//! two responses race, the last one applied wins.

use crate::models::{payment::Payment, trip::Trip};

pub trait Record: Clone {
    fn id(&self) -> &str;
}

impl Record for Trip {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Payment {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct RecordCache<T> {
    all: Vec<T>,
    results: Vec<T>,
    searching: bool,
}

impl<T> Default for RecordCache<T> {
    fn default() -> Self {
        Self {
            all: Vec::new(),
            results: Vec::new(),
            searching: false,
        }
    }
}

impl<T: Record> RecordCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[T] {
        &self.all
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.all
            .iter()
            .chain(self.results.iter())
            .find(|record| record.id() == id)
    }

    /// Replaces everything with a fresh listing and leaves search mode.
    pub fn load(&mut self, records: Vec<T>) {
        self.results = records.clone();
        self.all = records;
        self.searching = false;
    }

    /// A newly created record only shows up in the table when no search is
    /// narrowing it.
    pub fn insert(&mut self, record: T) {
        if !self.searching {
            self.results.push(record.clone());
        }
        self.all.push(record);
    }

    /// Swaps in the server's version of a record wherever it is held.
    pub fn replace(&mut self, record: T) -> bool {
        let mut found = false;
        for slot in self.all.iter_mut().chain(self.results.iter_mut()) {
            if slot.id() == record.id() {
                *slot = record.clone();
                found = true;
            }
        }
        found
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.all.len() + self.results.len();
        self.all.retain(|record| record.id() != id);
        self.results.retain(|record| record.id() != id);
        before != self.all.len() + self.results.len()
    }

    pub fn show_results(&mut self, records: Vec<T>) {
        self.results = records;
        self.searching = true;
    }

    pub fn clear_search(&mut self) {
        self.results = self.all.clone();
        self.searching = false;
    }
}
