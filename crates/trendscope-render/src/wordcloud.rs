//! Word cloud of rising related queries.
//!
//! Text is tokenised into words, stopwords and bare numbers are dropped,
//! possessive `'s` is stripped and plurals are folded into their singular
//! form when both appear. Adjacent word pairs that co-occur far more often
//! than chance are kept as two-word phrases and their counts are taken out of
//! the single words. The most frequent entries are then laid out along an
//! Archimedean spiral from the canvas centre, largest first, and rendered as
//! SVG. Layout is deterministic: the same text always yields the same cloud.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use serde::Serialize;
use trendscope_core::RelatedQuery;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w[\w']+").expect("valid regex"));

/// Common English words excluded from the cloud.
pub(crate) const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else",
    "ever", "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "like", "me", "more", "most", "my", "myself",
    "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought",
    "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should", "since",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Word fills, cycled in placement order.
const PALETTE: &[&str] = &[
    "#440154", "#46327e", "#365c8d", "#277f8e", "#1fa187", "#4ac16d", "#a0da39", "#fde725",
];

/// Minimum log-likelihood score for a word pair to count as a phrase.
const COLLOCATION_THRESHOLD: f64 = 30.0;

const SPIRAL_STEPS: u32 = 2_500;
const SPIRAL_ANGLE_STEP: f64 = 0.1;
const SPIRAL_RADIUS_STEP: f64 = 1.2;
const SHRINK_FACTOR: f64 = 0.85;
const GLYPH_WIDTH_RATIO: f64 = 0.55;
const PADDING: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub background: String,
    pub min_font_size: f64,
    pub max_font_size: f64,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            max_words: 25,
            background: "white".to_string(),
            min_font_size: 8.0,
            max_font_size: 96.0,
        }
    }
}

impl WordCloudOptions {
    #[must_use]
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }
}

/// A word and how often it occurred after folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_size: f64,
    /// Centre of the word's bounding box.
    pub x: f64,
    pub y: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloud {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub words: Vec<PlacedWord>,
}

/// Joins query strings into the text the cloud is built from.
#[must_use]
pub fn text_from_queries(queries: &[RelatedQuery]) -> String {
    queries
        .iter()
        .map(|q| q.query.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Counts words and two-word phrases in `text` and returns the `max_words`
/// most frequent, highest count first with ties broken alphabetically.
#[must_use]
pub fn word_frequencies(text: &str, max_words: usize) -> Vec<WordCount> {
    let tokens = tokenize(text);
    let is_stopword = |word: &str| STOPWORDS.contains(&word);

    let mut unigrams: BTreeMap<String, usize> = BTreeMap::new();
    for word in tokens.iter().filter(|w| !is_stopword(w.as_str())) {
        *unigrams.entry(word.clone()).or_default() += 1;
    }
    let total: usize = unigrams.values().sum();
    let singular_of = fold_plurals(&mut unigrams);

    // Pairs are taken before stopwords are removed so words separated by a
    // stopword never pair up.
    let mut bigrams: BTreeMap<String, usize> = BTreeMap::new();
    for pair in tokens.windows(2) {
        if !is_stopword(&pair[0]) && !is_stopword(&pair[1]) {
            *bigrams
                .entry(format!("{} {}", pair[0], pair[1]))
                .or_default() += 1;
        }
    }
    fold_plurals(&mut bigrams);

    let mut counts = unigrams.clone();
    for (bigram, &count) in &bigrams {
        let Some((first, second)) = bigram.split_once(' ') else {
            continue;
        };
        let first = singular_of.get(first).map_or(first, String::as_str);
        let second = singular_of.get(second).map_or(second, String::as_str);
        if first == second {
            continue;
        }
        let score = collocation_score(
            count,
            unigrams.get(first).copied().unwrap_or(0),
            unigrams.get(second).copied().unwrap_or(0),
            total,
        );
        if score > COLLOCATION_THRESHOLD {
            for word in [first, second] {
                if let Some(n) = counts.get_mut(word) {
                    *n = n.saturating_sub(count);
                }
            }
            counts.insert(bigram.clone(), count);
        }
    }
    counts.retain(|_, n| *n > 0);

    let mut ranked: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked.truncate(max_words);
    ranked
}

/// Lowercased words with possessives stripped, minus single letters and
/// bare numbers. Stopwords are kept.
fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .filter_map(|m| {
            let mut word = m.as_str().to_lowercase();
            if word.ends_with("'s") {
                word.truncate(word.len() - 2);
            }
            (word.chars().count() >= 2 && !word.chars().all(char::is_numeric)).then_some(word)
        })
        .collect()
}

/// Merges each plural into its singular when both are present and returns
/// the plural to singular mapping.
fn fold_plurals(counts: &mut BTreeMap<String, usize>) -> BTreeMap<String, String> {
    let plurals: Vec<String> = counts
        .keys()
        .filter(|w| w.ends_with('s') && !w.ends_with("ss"))
        .filter(|w| counts.contains_key(&w[..w.len() - 1]))
        .cloned()
        .collect();
    let mut singular_of = BTreeMap::new();
    for plural in plurals {
        let singular = plural[..plural.len() - 1].to_string();
        if let Some(n) = counts.remove(&plural) {
            *counts.entry(singular.clone()).or_default() += n;
        }
        singular_of.insert(plural, singular);
    }
    singular_of
}

/// Dunning log-likelihood ratio for `pair` occurrences of a word pair whose
/// words occur `first` and `second` times among `total` words.
#[allow(clippy::cast_precision_loss)]
fn collocation_score(pair: usize, first: usize, second: usize, total: usize) -> f64 {
    if first == 0 || second == 0 || total <= first || total <= second {
        return 0.0;
    }
    let (c12, c1, c2, n) = (pair as f64, first as f64, second as f64, total as f64);
    let p = c2 / n;
    let p1 = c12 / c1;
    let p2 = (c2 - c12) / (n - c1);
    -2.0 * (log_likelihood(c12, c1, p) + log_likelihood(c2 - c12, n - c1, p)
        - log_likelihood(c12, c1, p1)
        - log_likelihood(c2 - c12, n - c1, p2))
}

fn log_likelihood(k: f64, n: f64, x: f64) -> f64 {
    x.max(1e-10).ln() * k + (1.0 - x).max(1e-10).ln() * (n - k)
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Rect {
    fn centred(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            x0: cx - w / 2.0,
            y0: cy - h / 2.0,
            x1: cx + w / 2.0,
            y1: cy + h / 2.0,
        }
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.x0 < other.x1 + PADDING
            && other.x0 < self.x1 + PADDING
            && self.y0 < other.y1 + PADDING
            && other.y0 < self.y1 + PADDING
    }

    fn inside(&self, width: f64, height: f64) -> bool {
        self.x0 >= PADDING
            && self.y0 >= PADDING
            && self.x1 <= width - PADDING
            && self.y1 <= height - PADDING
    }
}

impl WordCloud {
    /// Builds a cloud from free text. Returns `None` when no word survives
    /// filtering or none fits on the canvas.
    #[must_use]
    pub fn generate(text: &str, options: &WordCloudOptions) -> Option<Self> {
        let ranked = word_frequencies(text, options.max_words);
        let cloud = Self::from_frequencies(&ranked, options);
        if cloud.words.is_empty() {
            None
        } else {
            Some(cloud)
        }
    }

    /// Lays out already-counted words, largest first. Words that cannot be
    /// placed even at the minimum font size are dropped.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_frequencies(ranked: &[WordCount], options: &WordCloudOptions) -> Self {
        let width = f64::from(options.width);
        let height = f64::from(options.height);
        let top = ranked.iter().map(|w| w.count).max().unwrap_or(1).max(1) as f64;
        let mut placed: Vec<PlacedWord> = Vec::with_capacity(ranked.len());
        let mut boxes: Vec<Rect> = Vec::with_capacity(ranked.len());

        for entry in ranked {
            let weight = entry.count as f64 / top;
            let chars = entry.word.chars().count() as f64;
            let mut size = options.max_font_size * (0.5 * weight + 0.5);

            while size >= options.min_font_size {
                let w = chars * size * GLYPH_WIDTH_RATIO;
                if let Some((cx, cy, rect)) = find_spot(width, height, w, size, &boxes) {
                    let color = PALETTE[placed.len() % PALETTE.len()];
                    boxes.push(rect);
                    placed.push(PlacedWord {
                        word: entry.word.clone(),
                        count: entry.count,
                        font_size: (size * 10.0).round() / 10.0,
                        x: cx,
                        y: cy,
                        color,
                    });
                    break;
                }
                size *= SHRINK_FACTOR;
            }
            if size < options.min_font_size {
                tracing::debug!(word = %entry.word, "word cloud: no room for word");
            }
        }

        Self {
            width: options.width,
            height: options.height,
            background: options.background.clone(),
            words: placed,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\" aria-label=\"Rising queries word cloud\">\n",
            w = self.width,
            h = self.height
        );
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
            encode_double_quoted_attribute(&self.background)
        ));
        for word in &self.words {
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{:.1}\" font-family=\"sans-serif\" text-anchor=\"middle\" dominant-baseline=\"central\" fill=\"{}\">{}</text>\n",
                word.x,
                word.y,
                word.font_size,
                word.color,
                encode_text(&word.word)
            ));
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn find_spot(
    width: f64,
    height: f64,
    w: f64,
    h: f64,
    taken: &[Rect],
) -> Option<(f64, f64, Rect)> {
    if w + 2.0 * PADDING > width || h + 2.0 * PADDING > height {
        return None;
    }
    let (cx, cy) = (width / 2.0, height / 2.0);
    let aspect = width / height;
    for step in 0..SPIRAL_STEPS {
        let theta = f64::from(step) * SPIRAL_ANGLE_STEP;
        let r = theta * SPIRAL_RADIUS_STEP;
        let x = (cx + r * theta.cos() * aspect).round();
        let y = (cy + r * theta.sin()).round();
        let rect = Rect::centred(x, y, w, h);
        if rect.inside(width, height) && !taken.iter().any(|t| t.overlaps(&rect)) {
            return Some((x, y, rect));
        }
    }
    None
}

#[cfg(test)]
#[path = "wordcloud_test.rs"]
mod tests;
