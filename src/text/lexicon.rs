//! Static word lists. Built once, read-only afterwards.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

fn set(words: &[&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

/// A list of words or multi-word phrases matched case-insensitively on word
/// boundaries.
pub struct PhraseSet {
    entries: Vec<(&'static str, Regex)>,
}

impl PhraseSet {
    fn new(phrases: &[&'static str]) -> Self {
        let entries = phrases
            .iter()
            .map(|phrase| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
                (*phrase, Regex::new(&pattern).expect("escaped phrase pattern"))
            })
            .collect();
        Self { entries }
    }

    /// Distinct phrases that occur in `text`.
    pub fn found_in(&self, text: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(phrase, _)| *phrase)
            .collect()
    }

    pub fn count_distinct(&self, text: &str) -> usize {
        self.entries.iter().filter(|(_, re)| re.is_match(text)).count()
    }

    pub fn any_in(&self, text: &str) -> bool {
        self.entries.iter().any(|(_, re)| re.is_match(text))
    }

    /// Total number of occurrences of all phrases.
    pub fn count_occurrences(&self, text: &str) -> usize {
        self.entries
            .iter()
            .map(|(_, re)| re.find_iter(text).count())
            .sum()
    }
}

pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
        "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
        "is", "it", "it's", "its", "itself", "just", "me", "more", "most", "my", "myself", "no",
        "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
    ])
});

pub static SIMPLE_CONNECTORS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "and", "but", "so", "because", "also", "then", "or", "first", "second", "finally",
        "besides", "too",
    ])
});

pub static COMPLEX_CONNECTORS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "however",
        "therefore",
        "furthermore",
        "moreover",
        "consequently",
        "nevertheless",
        "nonetheless",
        "in addition",
        "as a result",
        "on the other hand",
        "in contrast",
        "whereas",
        "although",
        "thus",
        "hence",
        "meanwhile",
        "similarly",
        "likewise",
        "for example",
        "for instance",
        "in particular",
        "in conclusion",
        "to summarize",
    ])
});

/// Markers that flag a reference sentence as carrying a main idea.
pub static DISCOURSE_MARKERS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "importantly",
        "most importantly",
        "the main",
        "key",
        "significant",
        "significantly",
        "primarily",
        "essentially",
        "crucially",
        "notably",
        "in summary",
        "in conclusion",
        "overall",
        "therefore",
        "as a result",
    ])
});

pub static ARGUMENT_MARKERS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "firstly",
        "secondly",
        "thirdly",
        "on the one hand",
        "on the other hand",
        "however",
        "nevertheless",
        "in contrast",
        "similarly",
        "likewise",
        "for example",
        "for instance",
        "such as",
        "specifically",
    ])
});

pub static CONCLUSION_MARKERS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "in conclusion",
        "to conclude",
        "therefore",
        "thus",
        "hence",
        "as a result",
        "consequently",
        "overall",
        "in summary",
    ])
});

/// Logical connectors counted by the essay development criterion.
pub static ESSAY_CONNECTORS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "however",
        "therefore",
        "furthermore",
        "moreover",
        "in addition",
        "consequently",
        "as a result",
        "on the other hand",
        "nevertheless",
        "firstly",
        "secondly",
        "finally",
        "in conclusion",
        "to summarize",
    ])
});

pub static CLAUSE_MARKERS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "because", "although", "while", "when", "if", "unless", "since", "as",
    ])
});

pub static PASSIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(am|is|are|was|were|be|been|being)\s+\w+ed\b",
        r"(?i)\b(has|have|had)\s+been\s+\w+ing\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("passive voice pattern"))
    .collect()
});

pub static FILLERS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "um", "uh", "erm", "ah", "like", "you know", "well", "so", "actually",
    ])
});

pub static SUBJECTIVE_MARKERS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "think",
        "feel",
        "believe",
        "guess",
        "suppose",
        "assume",
        "reckon",
        "probably",
        "maybe",
        "perhaps",
        "possibly",
        "likely",
        "unlikely",
        "might",
        "could",
        "may",
        "seem",
        "appear",
        "suggest",
        "suggests",
        "in my opinion",
        "personally",
        "from my perspective",
        "it seems to me",
        "somewhat",
        "rather",
        "quite",
        "fairly",
        "relatively",
        "allegedly",
        "supposedly",
        "reportedly",
        "apparently",
    ])
});

pub const ACADEMIC_SUFFIXES: &[&str] = &[
    "tion", "ment", "ness", "ity", "ism", "ize", "ify", "ous", "ive", "ent", "ant", "ary", "ory",
    "ate", "ure", "ence", "ance", "able", "ible",
];

pub const ACADEMIC_PREFIXES: &[&str] = &[
    "pre", "pro", "anti", "inter", "trans", "sub", "super", "multi", "over", "under", "semi",
    "non", "dis", "mis", "un", "re", "de", "ex",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CefrBand {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

static CEFR_BANDS: Lazy<Vec<(CefrBand, HashSet<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            CefrBand::A1,
            set(&[
                "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
                "by", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do",
                "does", "did", "will", "would", "could", "should", "may", "might", "can", "must",
                "shall",
            ]),
        ),
        (
            CefrBand::A2,
            set(&[
                "good", "bad", "big", "small", "new", "old", "young", "hot", "cold", "happy",
                "sad", "easy", "hard", "fast", "slow", "high", "low", "long", "short", "right",
                "wrong", "same", "different", "first", "last", "next", "many", "much", "few",
                "little", "some", "any", "all", "every", "each", "other", "another",
            ]),
        ),
        (
            CefrBand::B1,
            set(&[
                "important", "necessary", "possible", "impossible", "difficult", "simple",
                "complex", "basic", "advanced", "modern", "traditional", "personal", "public",
                "private", "national", "international", "local", "global", "economic", "social",
                "political", "cultural", "environmental", "educational", "professional",
                "commercial", "industrial", "agricultural",
            ]),
        ),
        (
            CefrBand::B2,
            set(&[
                "significant", "substantial", "considerable", "remarkable", "notable",
                "distinctive", "characteristic", "representative", "typical", "conventional",
                "contemporary", "innovative", "revolutionary", "fundamental", "essential",
                "crucial", "critical", "vital", "indispensable", "comprehensive", "thorough",
                "extensive", "intensive", "systematic", "methodical", "analytical",
                "theoretical", "practical", "empirical", "experimental",
            ]),
        ),
        (
            CefrBand::C1,
            set(&[
                "sophisticated", "elaborate", "intricate", "nuanced", "subtle", "profound",
                "exhaustive", "meticulous", "rigorous", "methodological", "conceptual",
                "philosophical", "ideological", "paradigmatic", "epistemological",
                "ontological", "phenomenological", "hermeneutic", "dialectical", "heuristic",
                "algorithmic", "stochastic", "probabilistic", "deterministic", "systemic",
                "holistic", "integrative",
            ]),
        ),
        (
            CefrBand::C2,
            set(&[
                "esoteric", "arcane", "abstruse", "recondite", "cryptic", "enigmatic",
                "paradoxical", "oxymoronic", "tautological", "redundant", "superfluous",
                "extraneous", "tangential", "peripheral", "marginal", "negligible",
                "infinitesimal", "minuscule", "microscopic", "macroscopic", "cosmic",
                "universal", "omnipresent", "ubiquitous", "pervasive", "permeating",
                "saturating", "infiltrating", "penetrating", "percolating",
            ]),
        ),
    ]
});

/// Lowest band listing `word`, if any.
pub fn cefr_band(word: &str) -> Option<CefrBand> {
    CEFR_BANDS
        .iter()
        .find(|(_, words)| words.contains(word))
        .map(|(band, _)| *band)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyBand {
    High,
    Mid,
    Low,
    Rare,
}

static HIGH_FREQUENCY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
        "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
        "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
        "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "is", "are",
        "was", "were", "has", "had",
    ])
});

static MID_FREQUENCY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "when", "make", "can", "like", "time", "no", "just", "him", "know", "take", "people",
        "into", "year", "your", "good", "some", "could", "them", "see", "other", "than", "then",
        "now", "look", "only", "come", "its", "over", "think", "also", "back", "after", "use",
        "two", "how", "our", "work", "first", "well", "way", "even", "new", "want", "because",
        "any", "these", "give", "day", "most", "us",
    ])
});

static LOW_FREQUENCY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "important", "necessary", "possible", "difficult", "simple", "complex", "basic",
        "advanced", "modern", "traditional", "personal", "public", "private", "national",
        "international", "local", "global", "economic", "social", "political", "cultural",
        "environmental", "educational", "professional", "commercial", "industrial",
        "agricultural",
    ])
});

pub fn frequency_band(word: &str) -> FrequencyBand {
    if HIGH_FREQUENCY.contains(word) {
        FrequencyBand::High
    } else if MID_FREQUENCY.contains(word) {
        FrequencyBand::Mid
    } else if LOW_FREQUENCY.contains(word) {
        FrequencyBand::Low
    } else {
        FrequencyBand::Rare
    }
}

pub static INFORMAL_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "really", "very", "pretty", "quite", "totally", "absolutely", "definitely", "obviously",
        "clearly", "basically", "actually", "literally", "seriously", "huge", "tiny", "loads",
        "tons", "stuff", "things", "guy", "guys", "ok", "okay", "awesome", "cool", "super",
        "mega", "ultra", "big", "small", "lots", "bunch",
    ])
});

pub static VAGUE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "thing", "stuff", "something", "someone", "somewhere", "somehow", "various", "different",
        "certain", "some", "many", "several", "numerous", "lots", "bunch", "kind", "sort", "type",
        "way", "part", "area", "aspect", "factor",
    ])
});

pub static CONTRACTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "won't", "can't", "shouldn't", "wouldn't", "couldn't", "didn't", "doesn't", "don't",
        "isn't", "aren't", "wasn't", "weren't", "haven't", "hasn't", "hadn't", "i'm", "you're",
        "he's", "she's", "it's", "we're", "they're", "i've", "you've", "we've", "they've", "i'll",
        "you'll", "he'll", "she'll", "it'll", "we'll", "they'll",
    ])
});

/// Words of six or more letters that carry an academic affix.
pub fn is_academic(word: &str) -> bool {
    word.chars().count() >= 6
        && (ACADEMIC_SUFFIXES.iter().any(|suffix| word.ends_with(suffix))
            || ACADEMIC_PREFIXES.iter().any(|prefix| word.starts_with(prefix)))
}

pub fn is_content_word(word: &str) -> bool {
    word.chars().count() > 2 && !STOP_WORDS.contains(word)
}
