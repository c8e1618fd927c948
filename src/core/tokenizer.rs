//! Token counting module - Approximate token counts for context budgeting
//!
//! The default [`TokenModel::Heuristic`] is a cheap character/word blend and
//! is what budgeting uses unless told otherwise. The tiktoken encodings are
//! available for users who want numbers closer to a real tokenizer; all
//! models are deterministic.
//!
//! ```rust
//! use codebase_context::core::tokenizer::{count_tokens, TokenModel};
//!
//! let tokens = count_tokens("fn main() {}", TokenModel::default());
//! assert!(tokens > 0);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

/// Supported token models/encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenModel {
    /// Average of the character rule and a word rule (~0.75 words per token)
    #[default]
    Heuristic,
    /// Plain 1 token per 4 characters
    Chars,
    /// cl100k_base encoding (GPT-4, GPT-3.5-turbo)
    Cl100k,
    /// o200k_base encoding (GPT-4o)
    O200k,
}

impl TokenModel {
    fn get_bpe(&self) -> Option<&'static CoreBPE> {
        match self {
            TokenModel::Cl100k => CL100K_BPE.as_ref().ok(),
            TokenModel::O200k => O200K_BPE.as_ref().ok(),
            TokenModel::Heuristic | TokenModel::Chars => None,
        }
    }

    /// List all available models
    pub fn available_models() -> &'static [&'static str] {
        &["heuristic", "chars", "cl100k", "o200k"]
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Heuristic => "heuristic",
            TokenModel::Chars => "chars",
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heuristic" | "default" | "estimate" => Ok(TokenModel::Heuristic),
            "chars" | "fast" => Ok(TokenModel::Chars),
            "cl100k" | "cl100k_base" | "gpt4" | "gpt-4" => Ok(TokenModel::Cl100k),
            "o200k" | "o200k_base" | "gpt4o" | "gpt-4o" => Ok(TokenModel::O200k),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

// Loaded once on first use
static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("Failed to load cl100k_base: {}", e)));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("Failed to load o200k_base: {}", e)));

/// Count tokens in text using the specified model.
///
/// BPE models fall back to the heuristic if their encoding fails to load.
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model {
        TokenModel::Chars => estimate_tokens_chars(text),
        TokenModel::Heuristic => estimate_tokens(text),
        TokenModel::Cl100k | TokenModel::O200k => match model.get_bpe() {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => {
                log::debug!("{} encoding unavailable, using heuristic", model);
                estimate_tokens(text)
            }
        },
    }
}

/// 1 token per 4 characters, rounded down.
pub fn estimate_tokens_chars(text: &str) -> usize {
    text.chars().count() / 4
}

/// Blend of `chars / 4` and `words * 4 / 3`, rounded up.
///
/// Both inputs only grow as text is appended, so the estimate never shrinks
/// when more text is added.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let chars = text.chars().count();
    let words = text.split_whitespace().count();

    // (chars / 4 + words * 4 / 3) / 2 over a common denominator
    (3 * chars + 16 * words).div_ceil(24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_empty() {
        assert_eq!(count_tokens("", TokenModel::default()), 0);
        assert_eq!(count_tokens("", TokenModel::Chars), 0);
        assert_eq!(count_tokens("", TokenModel::Cl100k), 0);
    }

    #[test]
    fn test_chars_rule() {
        assert_eq!(estimate_tokens_chars(&"x".repeat(400)), 100);
        assert_eq!(estimate_tokens_chars("abc"), 0);
        // characters, not bytes
        assert_eq!(estimate_tokens_chars("你好世界"), 1);
    }

    #[test]
    fn test_heuristic_blend() {
        // 8 chars, 2 words: (24 + 32) / 24 = 2.33 -> 3
        assert_eq!(estimate_tokens("abc defg"), 3);
        // one long word: (300 + 16) / 24 = 13.17 -> 14
        assert_eq!(estimate_tokens(&"x".repeat(100)), 14);
    }

    #[test]
    fn test_heuristic_ascii() {
        let text = "Hello world, this is a test.";
        let tokens = estimate_tokens(text);
        assert!((5..=12).contains(&tokens));
    }

    #[test]
    fn test_heuristic_is_monotonic_over_prefixes() {
        let text = "fn main() {\n    println!(\"hi\");\n}\n  spaced   words here";
        let mut last = 0;
        for (idx, _) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            let tokens = estimate_tokens(&text[..idx]);
            assert!(tokens >= last, "estimate dropped at byte {}", idx);
            last = tokens;
        }
    }

    #[test]
    fn test_heuristic_deterministic() {
        let text = "pub struct Config { root: PathBuf }";
        assert_eq!(estimate_tokens(text), estimate_tokens(text));
    }

    #[test]
    fn test_count_tokens_bpe() {
        let text = "Hello, world!";
        let tokens = count_tokens(text, TokenModel::Cl100k);
        assert!(tokens > 0 && tokens < 10);
        assert!(count_tokens(text, TokenModel::O200k) > 0);
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!(
            "heuristic".parse::<TokenModel>().unwrap(),
            TokenModel::Heuristic
        );
        assert_eq!("chars".parse::<TokenModel>().unwrap(), TokenModel::Chars);
        assert_eq!("gpt-4".parse::<TokenModel>().unwrap(), TokenModel::Cl100k);
        assert_eq!("O200K".parse::<TokenModel>().unwrap(), TokenModel::O200k);
        assert!("unknown".parse::<TokenModel>().is_err());
    }

    #[test]
    fn test_model_display() {
        assert_eq!(TokenModel::Heuristic.to_string(), "heuristic");
        assert_eq!(TokenModel::Cl100k.to_string(), "cl100k");
    }
}
