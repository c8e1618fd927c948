//! Selection flow - order candidates and fit them into the token budget
//!
//! Ordering:
//! 1. Priority matches, in the order the fragments were given
//! 2. Everything else by depth, then path
//!
//! Budgeting walks that order once. A non-priority file that does not fit is
//! skipped and the scan goes on, since a later, smaller file may still fit.
//! Priority files always go in; if that breaks the ceiling the result is
//! flagged `over_budget`.

use std::cmp::Ordering;

use crate::core::config::ContextConfig;
use crate::core::file_reader::read_text;
use crate::core::model::{CandidateFile, SelectionResult, SkipReason, SkippedFile};
use crate::core::paths::ends_with_fragment;
use crate::core::tokenizer::count_tokens;

/// Reserved for the header, summary and structure tree
pub const BASE_OVERHEAD_TOKENS: usize = 256;

/// Reserved for the delimiter block wrapping each file
pub const FILE_HEADER_TOKENS: usize = 32;

/// Index of the first priority fragment matching `path`
fn priority_rank(path: &str, priority: &[String]) -> Option<usize> {
    priority
        .iter()
        .position(|fragment| ends_with_fragment(path, fragment))
}

/// Shallower first, then path
fn secondary_order(a: &CandidateFile, b: &CandidateFile) -> Ordering {
    a.depth.cmp(&b.depth).then_with(|| a.path.cmp(&b.path))
}

/// Drop files failing the extension filter and sort the rest into selection
/// order. Priority-matched files get their `priority` flag set.
pub fn order_candidates(candidates: Vec<CandidateFile>, config: &ContextConfig) -> Vec<CandidateFile> {
    let mut ranked: Vec<(Option<usize>, CandidateFile)> = candidates
        .into_iter()
        .filter(|c| {
            let allowed = config.extensions.allows(&c.extension);
            if !allowed {
                log::trace!("Extension filter drops {}", c.path);
            }
            allowed
        })
        .map(|mut c| {
            let rank = priority_rank(&c.path, &config.priority);
            c.priority = rank.is_some();
            (rank, c)
        })
        .collect();

    ranked.sort_by(|(ra, a), (rb, b)| match (ra, rb) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| secondary_order(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => secondary_order(a, b),
    });

    ranked.into_iter().map(|(_, c)| c).collect()
}

/// Read a candidate and attach its token estimate
fn load(candidate: CandidateFile, config: &ContextConfig) -> Result<CandidateFile, SkippedFile> {
    let content = read_text(&candidate.full_path, &candidate.path, &config.read_config())?;
    let tokens = count_tokens(&content, config.token_model);
    Ok(candidate.with_content(content, tokens))
}

#[cfg(not(feature = "parallel"))]
fn load_in_order<'a>(
    ordered: Vec<CandidateFile>,
    config: &'a ContextConfig,
) -> impl Iterator<Item = Result<CandidateFile, SkippedFile>> + 'a {
    ordered.into_iter().map(move |c| load(c, config))
}

/// Reads run in parallel, but results keep the candidate order so budget
/// decisions are the same as the sequential path.
#[cfg(feature = "parallel")]
fn load_in_order<'a>(
    ordered: Vec<CandidateFile>,
    config: &'a ContextConfig,
) -> impl Iterator<Item = Result<CandidateFile, SkippedFile>> + 'a {
    use rayon::prelude::*;

    let loaded: Vec<_> = ordered.into_par_iter().map(|c| load(c, config)).collect();
    loaded.into_iter()
}

/// Token cost of including a loaded file
pub fn file_cost(file: &CandidateFile) -> usize {
    file.tokens() + FILE_HEADER_TOKENS
}

/// Decide which candidates make it into the context, in output order
pub fn select(candidates: Vec<CandidateFile>, config: &ContextConfig) -> SelectionResult {
    let ordered = order_candidates(candidates, config);
    let max_tokens = config.max_tokens;

    let mut result = SelectionResult {
        total_tokens: BASE_OVERHEAD_TOKENS,
        max_tokens,
        candidates: ordered.len(),
        ..Default::default()
    };

    for loaded in load_in_order(ordered, config) {
        let file = match loaded {
            Ok(file) => file,
            Err(skipped) => {
                log::warn!(
                    "Skipping {}: {}",
                    skipped.path,
                    skipped.message.as_deref().unwrap_or(skipped.reason.as_str())
                );
                result.skipped.push(skipped);
                continue;
            }
        };

        let cost = file_cost(&file);

        if file.priority {
            result.total_tokens += cost;
            if result.total_tokens > max_tokens && !result.over_budget {
                log::warn!(
                    "Priority file {} pushes the context over budget ({} > {})",
                    file.path,
                    result.total_tokens,
                    max_tokens
                );
                result.over_budget = true;
            }
            result.files.push(file);
            continue;
        }

        if result.total_tokens + cost <= max_tokens {
            result.total_tokens += cost;
            result.files.push(file);
        } else {
            log::debug!(
                "Budget skip: {} needs {} tokens, {} left",
                file.path,
                cost,
                max_tokens.saturating_sub(result.total_tokens)
            );
            if !result.budget_exceeded {
                result.budget_exceeded = true;
                result.first_budget_skip = Some(file.path.clone());
            }
            result
                .skipped
                .push(SkippedFile::new(file.path, SkipReason::Budget));
        }
    }

    log::debug!(
        "Selected {}/{} files, ~{} tokens",
        result.files.len(),
        result.candidates,
        result.total_tokens
    );
    result
}
