use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

use crate::error::{Error, Result};

static LANG_DIR: Dir = include_dir!("src/lang");

/// Name of the corpus shipped with the binary.
pub const BUILTIN_CORPUS: &str = "sentences";

#[derive(Deserialize)]
struct CorpusFile {
    name: String,
    sentences: Vec<String>,
}

/// Ordered list of sample sentences the target text is built from.
///
/// A `Corpus` always holds at least one non-blank sentence; constructing an
/// empty one is a configuration error.
#[derive(Clone, Debug, PartialEq)]
pub struct Corpus {
    pub name: String,
    sentences: Vec<String>,
}

impl Corpus {
    pub fn new(name: impl Into<String>, sentences: Vec<String>) -> Result<Self> {
        let sentences: Vec<String> = sentences
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if sentences.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        Ok(Self {
            name: name.into(),
            sentences,
        })
    }

    /// The corpus embedded at build time.
    pub fn builtin() -> Result<Self> {
        read_corpus_from_file(&format!("{BUILTIN_CORPUS}.json"))
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn word_count(&self) -> usize {
        self.sentences
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum()
    }
}

fn read_corpus_from_file(file_name: &str) -> Result<Corpus> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| Error::MissingCorpus(file_name.to_string()))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| Error::MissingCorpus(file_name.to_string()))?;

    let parsed: CorpusFile = from_str(contents)?;
    Corpus::new(parsed.name, parsed.sentences)
}
