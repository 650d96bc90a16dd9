//! Sequence corpus: per-word frame sequences and their flattened encoding.
//!
//! A word's training data is kept twice: as the list of sequences (needed by
//! the fold splitter) and as one [`Xlengths`] (what the engine consumes).
//! Words are stored in a `BTreeMap`, so every iteration over the vocabulary is
//! sorted and reproducible.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One fixed-dimension feature vector.
pub type Frame = Vec<f64>;

/// Ordered frames for one instance of a word.
pub type Sequence = Vec<Frame>;

/// Errors raised while building or loading a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("sequence lengths sum to {expected} but {actual} frames were given")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("sequence {index} has length zero")]
    EmptySequence { index: usize },

    #[error("frame {index} has {got} features, expected {expected}")]
    RaggedFrames {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("word {word:?} has no sequences")]
    EmptyWord { word: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Flattened feature matrix plus per-sequence lengths.
///
/// Invariants: `lengths` sums to `x.len()`, no length is zero, and every
/// frame has the same dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Xlengths {
    x: Vec<Frame>,
    lengths: Vec<usize>,
}

impl Xlengths {
    /// Validate and wrap a flattened matrix.
    pub fn new(x: Vec<Frame>, lengths: Vec<usize>) -> Result<Self, CorpusError> {
        let expected: usize = lengths.iter().sum();
        if expected != x.len() {
            return Err(CorpusError::LengthMismatch {
                expected,
                actual: x.len(),
            });
        }
        if let Some(index) = lengths.iter().position(|&len| len == 0) {
            return Err(CorpusError::EmptySequence { index });
        }
        if let Some(first) = x.first() {
            let dim = first.len();
            if let Some((index, frame)) = x.iter().enumerate().find(|(_, f)| f.len() != dim) {
                return Err(CorpusError::RaggedFrames {
                    index,
                    expected: dim,
                    got: frame.len(),
                });
            }
        }
        Ok(Self { x, lengths })
    }

    /// Concatenate sequences, recording each one's length.
    pub fn from_sequences(sequences: &[Sequence]) -> Result<Self, CorpusError> {
        let lengths = sequences.iter().map(Vec::len).collect();
        let x = sequences.iter().flatten().cloned().collect();
        Self::new(x, lengths)
    }

    /// All frames, in sequence order.
    pub fn frames(&self) -> &[Frame] {
        &self.x
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Total frame count (N in the BIC penalty).
    pub fn n_frames(&self) -> usize {
        self.x.len()
    }

    /// Feature dimension, or 0 when there are no frames.
    pub fn n_features(&self) -> usize {
        self.x.first().map_or(0, Vec::len)
    }

    pub fn n_sequences(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate the sequences back out as frame slices.
    pub fn sequences(&self) -> impl Iterator<Item = &[Frame]> + '_ {
        let mut start = 0;
        self.lengths.iter().map(move |&len| {
            let seq = &self.x[start..start + len];
            start += len;
            seq
        })
    }
}

#[derive(Deserialize)]
struct RawXlengths {
    x: Vec<Frame>,
    lengths: Vec<usize>,
}

impl<'de> Deserialize<'de> for Xlengths {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawXlengths::deserialize(deserializer)?;
        Xlengths::new(raw.x, raw.lengths).map_err(serde::de::Error::custom)
    }
}

/// Concatenate the sequences at `indices` (in the given order).
///
/// Out-of-range indices are ignored.
pub fn combine_sequences(indices: &[usize], sequences: &[Sequence]) -> Result<Xlengths, CorpusError> {
    let selected: Vec<Sequence> = indices
        .iter()
        .filter_map(|&i| sequences.get(i).cloned())
        .collect();
    Xlengths::from_sequences(&selected)
}

/// Training data for one word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordData {
    sequences: Vec<Sequence>,
    xlengths: Xlengths,
}

impl WordData {
    pub fn new(sequences: Vec<Sequence>) -> Result<Self, CorpusError> {
        let xlengths = Xlengths::from_sequences(&sequences)?;
        Ok(Self {
            sequences,
            xlengths,
        })
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn xlengths(&self) -> &Xlengths {
        &self.xlengths
    }
}

/// Labeled training corpus keyed by word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    words: BTreeMap<String, WordData>,
}

#[derive(Deserialize)]
struct RawCorpus {
    words: BTreeMap<String, Vec<Sequence>>,
}

impl Corpus {
    /// Build a corpus from raw sequences, rejecting words with no data.
    pub fn from_sequences<I, S>(words: I) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = (S, Vec<Sequence>)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (word, sequences) in words {
            let word = word.into();
            if sequences.is_empty() {
                return Err(CorpusError::EmptyWord { word });
            }
            map.insert(word, WordData::new(sequences)?);
        }
        Ok(Self { words: map })
    }

    /// Load `{"words": {"WORD": [[[f64, ...], ...], ...]}}`.
    pub fn from_json_file(path: &Path) -> Result<Self, CorpusError> {
        let raw: RawCorpus = read_json(path)?;
        Self::from_sequences(raw.words)
    }

    pub fn sequences_for(&self, word: &str) -> Option<&[Sequence]> {
        self.words.get(word).map(WordData::sequences)
    }

    pub fn xlengths_for(&self, word: &str) -> Option<&Xlengths> {
        self.words.get(word).map(WordData::xlengths)
    }

    pub fn word(&self, word: &str) -> Option<&WordData> {
        self.words.get(word)
    }

    /// Vocabulary in sorted order.
    pub fn all_words(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.keys().map(String::as_str)
    }

    /// Every word's flattened data, sorted by word.
    pub fn all_xlengths(&self) -> impl Iterator<Item = (&str, &Xlengths)> + '_ {
        self.words
            .iter()
            .map(|(word, data)| (word.as_str(), data.xlengths()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// One unlabeled (or held-out labeled) recognition input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    /// True word, when known; never consulted by the recognizer.
    #[serde(default)]
    pub label: Option<String>,
    pub xlengths: Xlengths,
}

/// Ordered recognition inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSet {
    items: Vec<TestItem>,
}

impl TestSet {
    pub fn new(items: Vec<TestItem>) -> Self {
        Self { items }
    }

    /// Load `{"items": [{"label": "CAT", "xlengths": {"x": [...], "lengths": [...]}}]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, CorpusError> {
        read_json(path)
    }

    pub fn items(&self) -> &[TestItem] {
        &self.items
    }

    /// Inputs in caller order, ready for [`crate::recognize::recognize`].
    pub fn xlengths(&self) -> impl Iterator<Item = &Xlengths> + '_ {
        self.items.iter().map(|item| &item.xlengths)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CorpusError::Json {
        path: path.to_path_buf(),
        source,
    })
}
