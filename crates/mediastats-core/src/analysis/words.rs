/// Prompt word-frequency analysis.
///
/// Works on the positive prompt only: generation metadata conventionally
/// starts with the positive prompt and ends it at the `Negative prompt:` or
/// `Steps:` line, whichever appears first in that order of preference.
use crate::analysis::tags::percentage;
use crate::model::{PromptAnalysis, WordCount};
use crate::stopwords::StopwordSet;
use compact_str::CompactString;
use std::collections::HashMap;

/// Ranked words returned per folder.
pub const TOP_WORDS: usize = 50;

/// Tokens shorter than this are noise (single letters, stray digits).
pub const MIN_WORD_LENGTH: usize = 2;

/// The positive-prompt section of raw generation metadata.
///
/// Cuts at `\nNegative prompt:` when present, otherwise at `\nSteps:`,
/// otherwise the whole text is treated as prompt.
pub fn extract_positive_prompt(raw: &str) -> &str {
    if let Some(at) = raw.find("\nNegative prompt:") {
        &raw[..at]
    } else if let Some(at) = raw.find("\nSteps:") {
        &raw[..at]
    } else {
        raw
    }
}

/// Extract prompts from raw metadata texts and rank word frequencies.
///
/// Tokens are lowercased and split on non-alphanumeric boundaries; tokens
/// shorter than [`MIN_WORD_LENGTH`], pure-numeric tokens, and stopwords are
/// dropped. Ordering is count descending with the word ascending as the
/// tie-break, capped at [`TOP_WORDS`].
pub fn analyse_prompts<'a, I>(texts: I, stopwords: &StopwordSet) -> PromptAnalysis
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<CompactString, u64> = HashMap::new();
    let mut analysis = PromptAnalysis::default();

    for raw in texts {
        let prompt = extract_positive_prompt(raw);
        if prompt.trim().is_empty() {
            continue;
        }
        analysis.total_prompts_analyzed += 1;

        let lower = prompt.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()) {
            if token.chars().count() < MIN_WORD_LENGTH {
                continue;
            }
            if token.chars().all(|c| c.is_numeric()) {
                continue;
            }
            if stopwords.contains(token) {
                continue;
            }
            analysis.total_words_found += 1;
            *counts.entry(CompactString::from(token)).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(CompactString, u64)> = counts.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(TOP_WORDS);

    let total = analysis.total_words_found;
    analysis.top_words = ranked
        .into_iter()
        .map(|(word, count)| WordCount {
            word,
            count,
            percentage: percentage(count, total),
        })
        .collect();
    analysis
}
