use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::CandidateItem;
use crate::providers::CandidateSource;

pub const HIRAGANA: &str =
    "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわをん";

/// Random nonsense words drawn from the basic hiragana table.
pub struct Vocabulary {
    alphabet: Vec<char>,
    word_len: usize,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            alphabet: HIRAGANA.chars().collect(),
            word_len: 3,
        }
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.word_len)
            .filter_map(|_| self.alphabet.choose(rng))
            .collect()
    }

    fn pick(&self, limit: usize) -> Vec<CandidateItem> {
        let mut rng = rand::thread_rng();
        (0..limit)
            .map(|_| {
                let word = self.random_word(&mut rng);
                CandidateItem {
                    id: word.clone(),
                    title: word,
                    summary: String::new(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl CandidateSource for Vocabulary {
    fn name(&self) -> &'static str {
        "vocabulary"
    }

    async fn fetch(&self, limit: usize) -> Vec<CandidateItem> {
        self.pick(limit)
    }
}
