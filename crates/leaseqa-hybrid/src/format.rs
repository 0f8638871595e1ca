//! Render fused results into one bounded, citation-marked context block.

use std::collections::BTreeMap;

use leaseqa_core::types::{DocumentId, ScoredChunk};

pub const TRUNCATION_MARKER: &str = " [truncated]";
/// A chunk is only cut if at least this many characters of its text fit.
pub const MIN_PARTIAL_CHARS: usize = 64;
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Upper bound on the output length, in characters.
    pub max_chars: usize,
}

impl Default for FormatOptions {
    fn default() -> Self { Self { max_chars: DEFAULT_MAX_CONTEXT_CHARS } }
}

/// One block per chunk in rank order:
///
/// ```text
/// [1] Lease Agreement, page 4
/// The annual rent increase is three percent...
/// ```
///
/// Blocks are separated by a blank line. When the budget runs out, the first
/// chunk that does not fit is cut and marked if enough of it fits, and every
/// lower-ranked chunk is dropped. Pure: same input, same output.
pub fn format_results_for_prompt(results: &[ScoredChunk], titles: &BTreeMap<DocumentId, String>, options: &FormatOptions) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    let marker_len = TRUNCATION_MARKER.chars().count();

    for (i, sc) in results.iter().enumerate() {
        let sep = if out.is_empty() { "" } else { "\n\n" };
        let title = titles.get(&sc.document_id).map(String::as_str).filter(|t| !t.trim().is_empty()).unwrap_or(sc.document_id.as_str());
        let header = format!("[{}] {}, page {}\n", i + 1, title, sc.page_number);
        let body = sc.content.trim();

        let fixed = sep.chars().count() + header.chars().count();
        let body_len = body.chars().count();
        if used + fixed + body_len <= options.max_chars {
            out.push_str(sep);
            out.push_str(&header);
            out.push_str(body);
            used += fixed + body_len;
            continue;
        }

        let room = options.max_chars.saturating_sub(used + fixed + marker_len);
        if room >= MIN_PARTIAL_CHARS {
            let partial: String = body.chars().take(room).collect();
            out.push_str(sep);
            out.push_str(&header);
            out.push_str(partial.trim_end());
            out.push_str(TRUNCATION_MARKER);
        }
        tracing::debug!(emitted = i, dropped = results.len() - i, max_chars = options.max_chars, "context budget exhausted");
        break;
    }
    out
}
