use std::collections::BTreeMap;

use leaseqa_core::types::ScoredChunk;
use leaseqa_hybrid::format::{format_results_for_prompt, FormatOptions, MIN_PARTIAL_CHARS, TRUNCATION_MARKER};

fn scored(doc: &str, idx: usize, page: u32, content: &str, rank: usize) -> ScoredChunk {
    ScoredChunk {
        chunk_id: format!("{doc}:{idx}"),
        document_id: doc.into(),
        chunk_index: idx,
        page_number: page,
        content: content.into(),
        lexical_score: Some(1.0),
        vector_score: None,
        fused_score: 1.0 / rank as f32,
        rank,
    }
}

fn titles() -> BTreeMap<String, String> {
    [("d1".to_string(), "Lease Agreement".to_string()), ("d2".to_string(), "  ".to_string())].into()
}

#[test]
fn renders_citation_headers_in_rank_order() {
    let results = vec![scored("d1", 3, 4, "  Rent rises 3% yearly.  ", 1), scored("d2", 0, 1, "Pets allowed.", 2), scored("d9", 0, 7, "Orphan text.", 3)];
    let out = format_results_for_prompt(&results, &titles(), &FormatOptions::default());
    assert_eq!(
        out,
        "[1] Lease Agreement, page 4\nRent rises 3% yearly.\n\n[2] d2, page 1\nPets allowed.\n\n[3] d9, page 7\nOrphan text."
    );
}

#[test]
fn empty_results_render_empty() {
    assert_eq!(format_results_for_prompt(&[], &titles(), &FormatOptions::default()), "");
}

#[test]
fn drops_lowest_ranked_chunks_first() {
    let first = "a".repeat(50);
    let results = vec![scored("d1", 0, 1, &first, 1), scored("d1", 1, 2, &"b".repeat(500), 2)];
    let header_len = "[1] Lease Agreement, page 1\n".len();
    // Room for the first block only; the second cannot fit even partially.
    let budget = header_len + 50 + 40;
    let out = format_results_for_prompt(&results, &titles(), &FormatOptions { max_chars: budget });
    assert_eq!(out, format!("[1] Lease Agreement, page 1\n{first}"));
    assert!(!out.contains(TRUNCATION_MARKER));
}

#[test]
fn partial_chunk_is_marked_and_within_budget() {
    let results = vec![scored("d1", 0, 1, "short clause", 1), scored("d1", 1, 2, &"word ".repeat(200), 2)];
    let budget = 300;
    let out = format_results_for_prompt(&results, &titles(), &FormatOptions { max_chars: budget });
    assert!(out.ends_with(TRUNCATION_MARKER));
    assert!(out.contains("[2] Lease Agreement, page 2\n"));
    assert!(out.chars().count() <= budget);
    let second_body = out.split("page 2\n").nth(1).unwrap();
    assert!(second_body.chars().count() >= MIN_PARTIAL_CHARS);
}

#[test]
fn budget_counts_characters_not_bytes() {
    let results = vec![scored("d1", 0, 1, &"é".repeat(300), 1)];
    let out = format_results_for_prompt(&results, &titles(), &FormatOptions { max_chars: 120 });
    assert!(out.chars().count() <= 120);
    assert!(out.ends_with(TRUNCATION_MARKER));
}

#[test]
fn output_is_deterministic() {
    let results = vec![scored("d1", 0, 1, "one", 1), scored("d2", 0, 3, "two", 2)];
    let a = format_results_for_prompt(&results, &titles(), &FormatOptions { max_chars: 64 });
    let b = format_results_for_prompt(&results, &titles(), &FormatOptions { max_chars: 64 });
    assert_eq!(a, b);
}
