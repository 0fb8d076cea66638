//! Scale-item extraction from pasted document text
//!
//! A heuristic text scraper, not a parser: detects the dominant language
//! from small stop-word inventories and pulls candidate scale items out of
//! numbered or bulleted lists. The caller reviews the candidates before
//! saving them as ScaleItems. Binary formats are refused with a typed
//! failure; decoding PDF/DOCX bytes is someone else's job.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Extensions whose content is already plain text
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Candidate lines shorter than this are treated as noise
const MIN_ITEM_LEN: usize = 4;

/// Minimum stop-word hits before a language is claimed
const MIN_LANGUAGE_HITS: usize = 3;

static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\(?\d{1,3}[.)\]]\s+(.+)$").expect("valid regex"));

static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*•]\s+(.+)$").expect("valid regex"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// English stop words for keyword-based detection
const ENGLISH_KEYWORDS: &[&str] = &[
    "the", "and", "of", "to", "is", "in", "that", "it", "for", "with", "you", "have", "are",
    "this", "not", "your", "when", "how", "feel",
];

/// Malay/Indonesian stop words
const MALAY_KEYWORDS: &[&str] = &[
    "dan", "yang", "saya", "untuk", "dengan", "tidak", "anda", "ini", "itu", "adalah", "pada",
    "atau", "dalam", "akan", "apabila", "rasa",
];

/// Typed extraction failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The declared extension is not a plain-text format
    #[error("Unsupported format: .{0} (supported: txt, md)")]
    UnsupportedFormat(String),

    /// The content is empty or not usable text
    #[error("Corrupt or empty content: {0}")]
    CorruptContent(String),
}

/// Detected dominant language of the pasted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Malay,
    Unknown,
}

/// Extraction output: detected language plus candidate item texts
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub language: Language,
    pub items: Vec<String>,
}

/// Extract candidate scale items from text pasted with a declared extension
pub fn extract_from_text(text: &str, extension: &str) -> Result<Extraction, ExtractError> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ExtractError::UnsupportedFormat(ext));
    }

    if text.trim().is_empty() {
        return Err(ExtractError::CorruptContent("no text content".to_string()));
    }
    // Embedded NUL bytes mean a binary file pasted with a text extension
    if text.contains('\0') {
        return Err(ExtractError::CorruptContent(
            "binary data in text content".to_string(),
        ));
    }

    Ok(Extraction {
        language: detect_language(text),
        items: extract_items(text),
    })
}

/// Keyword-based language detection over whitespace-separated tokens
pub fn detect_language(text: &str) -> Language {
    let mut english = 0usize;
    let mut malay = 0usize;

    for token in text.split_whitespace() {
        let word: String = token
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        if ENGLISH_KEYWORDS.contains(&word.as_str()) {
            english += 1;
        }
        if MALAY_KEYWORDS.contains(&word.as_str()) {
            malay += 1;
        }
    }

    if english < MIN_LANGUAGE_HITS && malay < MIN_LANGUAGE_HITS {
        Language::Unknown
    } else if english >= malay {
        Language::English
    } else {
        Language::Malay
    }
}

/// Pull candidate items out of the text, preferring explicit list markup
///
/// Numbered lists win over bullet lists; when neither is present every
/// long-enough line is a candidate.
pub fn extract_items(text: &str) -> Vec<String> {
    let numbered: Vec<String> = text
        .lines()
        .filter_map(|line| NUMBERED_ITEM.captures(line))
        .filter_map(|caps| clean_item(caps.get(1).map(|m| m.as_str()).unwrap_or("")))
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }

    let bulleted: Vec<String> = text
        .lines()
        .filter_map(|line| BULLET_ITEM.captures(line))
        .filter_map(|caps| clean_item(caps.get(1).map(|m| m.as_str()).unwrap_or("")))
        .collect();
    if !bulleted.is_empty() {
        return bulleted;
    }

    // Bare-line fallback
    text.lines().filter_map(clean_item).collect()
}

/// Normalize one candidate line; None drops it as noise
fn clean_item(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ").to_string();
    if collapsed.len() < MIN_ITEM_LEN {
        return None;
    }
    // Section headers are not items
    if collapsed.chars().all(|c| !c.is_lowercase()) {
        return None;
    }
    Some(collapsed)
}
