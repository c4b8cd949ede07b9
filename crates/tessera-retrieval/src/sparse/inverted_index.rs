//! Keyword → fragment postings with insertion ordinals.

use std::collections::HashMap;

use tessera_core::fragment::Fragment;

/// Immutable-by-convention inverted index. Live updates go through
/// [`SparseActivator`](super::SparseActivator), which clones on write.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    /// Fragment ids by insertion ordinal. Removed slots are `None`.
    ids: Vec<Option<String>>,
    ordinals: HashMap<String, usize>,
    postings: HashMap<String, Vec<usize>>,
    keywords: HashMap<usize, Vec<String>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from fragments in the given order.
    pub fn from_fragments<'a>(fragments: impl IntoIterator<Item = &'a Fragment>) -> Self {
        let mut index = Self::new();
        for f in fragments {
            index.insert(&f.id, &f.keywords);
        }
        index
    }

    /// Append a fragment. Re-inserting a known id replaces its keywords and
    /// keeps its original ordinal.
    pub fn insert(&mut self, id: &str, keywords: &[String]) {
        let ordinal = match self.ordinals.get(id) {
            Some(&ord) => {
                self.unlink(ord);
                ord
            }
            None => {
                let ord = self.ids.len();
                self.ids.push(Some(id.to_string()));
                self.ordinals.insert(id.to_string(), ord);
                ord
            }
        };

        let mut kws = keywords.to_vec();
        kws.sort();
        kws.dedup();
        for kw in &kws {
            self.postings.entry(kw.clone()).or_default().push(ordinal);
        }
        self.keywords.insert(ordinal, kws);
    }

    fn unlink(&mut self, ordinal: usize) {
        if let Some(kws) = self.keywords.remove(&ordinal) {
            for kw in kws {
                if let Some(list) = self.postings.get_mut(&kw) {
                    list.retain(|o| *o != ordinal);
                    if list.is_empty() {
                        self.postings.remove(&kw);
                    }
                }
            }
        }
    }

    /// Drop a fragment. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.ordinals.remove(id) {
            Some(ord) => {
                self.unlink(ord);
                self.ids[ord] = None;
                true
            }
            None => false,
        }
    }

    /// Fragments matching any of `query_keywords`, ranked by the number of
    /// distinct query keywords matched, ties by insertion order.
    pub fn lookup(&self, query_keywords: &[String], top_k: usize) -> Vec<String> {
        if top_k == 0 {
            return Vec::new();
        }
        let mut counts: HashMap<usize, usize> = HashMap::new();
        let mut seen = Vec::with_capacity(query_keywords.len());
        for kw in query_keywords {
            if seen.contains(&kw) {
                continue;
            }
            seen.push(kw);
            if let Some(list) = self.postings.get(kw) {
                for ord in list {
                    *counts.entry(*ord).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .filter_map(|(ord, _)| self.ids.get(ord).cloned().flatten())
            .take(top_k)
            .collect()
    }

    /// Indexed fragment count.
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    /// Distinct keywords with at least one posting.
    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ordinals.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn more_matches_rank_first_then_insertion_order() {
        let mut index = InvertedIndex::new();
        index.insert("a", &kws(&["harbor"]));
        index.insert("b", &kws(&["harbor", "fog"]));
        index.insert("c", &kws(&["harbor"]));
        let hits = index.lookup(&kws(&["harbor", "fog"]), 10);
        assert_eq!(hits, vec!["b", "a", "c"]);
    }

    #[test]
    fn remove_and_reinsert() {
        let mut index = InvertedIndex::new();
        index.insert("a", &kws(&["bell"]));
        index.insert("b", &kws(&["bell"]));
        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert_eq!(index.lookup(&kws(&["bell"]), 10), vec!["b"]);
        assert_eq!(index.len(), 1);

        index.insert("b", &kws(&["snow"]));
        assert!(index.lookup(&kws(&["bell"]), 10).is_empty());
        assert_eq!(index.vocabulary_size(), 1);
    }

    #[test]
    fn duplicate_query_keywords_count_once() {
        let mut index = InvertedIndex::new();
        index.insert("a", &kws(&["mule"]));
        index.insert("b", &kws(&["mule", "pass"]));
        let hits = index.lookup(&kws(&["mule", "mule", "pass"]), 1);
        assert_eq!(hits, vec!["b"]);
    }
}
