use crate::runtime::data_structures::word::{CloneMemo, WordPtr, deep_clone_word};
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};

/// The word dictionary used by the virtual machine.  A name-to-word mapping that also tracks the
/// most recently created word, which the annotating parsing words (`immediate`, `hidden`, `(`,
/// `("`) act upon.
#[derive(Default)]
pub struct Dictionary {
    words: HashMap<String, WordPtr>,
    last_word: Option<WordPtr>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary {
            words: HashMap::new(),
            last_word: None,
        }
    }

    /// The number of words in the dictionary.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up a word by name.
    pub fn try_get(&self, name: &str) -> Option<&WordPtr> {
        self.words.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.words.contains_key(name)
    }

    /// Insert a word silently.  Used for built-in registration and module merges; the last-word
    /// slot is left alone and no redefinition warning is given.
    pub fn register(&mut self, word: WordPtr) {
        let _ = self.words.insert(word.symbol().to_string(), word);
    }

    /// Insert a newly created word.  Replaces any prior binding under the same name, warning when
    /// asked to, and makes the word the new last word.
    pub fn define(&mut self, word: WordPtr, warn: bool) {
        if warn && self.words.contains_key(word.symbol()) {
            println!("Warning: redefining \"{}\" in dictionary", word.symbol());
        }

        self.words.insert(word.symbol().to_string(), word.clone());
        self.last_word = Some(word);
    }

    /// The most recently created word, if any.
    pub fn last_word(&self) -> Option<&WordPtr> {
        self.last_word.as_ref()
    }

    /// Iterate over all entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &WordPtr)> {
        self.words.iter()
    }

    /// All word names, sorted.  Used by `words` and by shell completion.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.words.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Deep clone the dictionary for the backup slot, resolving word references through the
    /// shared memo so the last-word slot and the entries stay consistent.
    pub fn deep_clone(&self, memo: &mut CloneMemo) -> Dictionary {
        let words = self
            .words
            .iter()
            .map(|(name, word)| (name.clone(), deep_clone_word(word, memo)))
            .collect();

        Dictionary {
            words,
            last_word: self.last_word.as_ref().map(|word| deep_clone_word(word, memo)),
        }
    }
}

/// Render all word names, sorted and space separated.  This is what `words` prints.
impl Display for Dictionary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.names().join(" "))
    }
}
