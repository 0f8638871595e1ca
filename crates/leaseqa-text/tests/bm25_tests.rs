use approx::assert_relative_eq;

use leaseqa_core::types::{Chunk, SourceKind};
use leaseqa_text::{lexical_search, Bm25Index, Bm25Params};

fn chunk(doc: &str, idx: usize, text: &str) -> Chunk {
    Chunk { id: format!("{doc}:{idx}"), document_id: doc.into(), page_number: 1, chunk_index: idx, content: text.into(), embedding: None }
}

fn corpus() -> Vec<Chunk> {
    vec![
        chunk("d1", 0, "The annual rent increase is three percent on each anniversary."),
        chunk("d1", 1, "Rent is payable monthly in advance."),
        chunk("d2", 0, "Pets are permitted with a deposit."),
    ]
}

#[test]
fn matches_reference_formula() {
    let chunks = vec![chunk("d", 0, "rent rent due"), chunk("d", 1, "deposit due")];
    let index = Bm25Index::build(&chunks, Bm25Params::default());
    let hits = index.search("rent");
    assert_eq!(hits.len(), 1);

    // N = 2, df = 1, tf = 2, len = 3, avg = 2.5
    let idf = (1.0f32 + (2.0 - 1.0 + 0.5) / (1.0 + 0.5)).ln();
    let (k1, b) = (1.2f32, 0.75f32);
    let expected = idf * (2.0 * (k1 + 1.0)) / (2.0 + k1 * (1.0 - b + b * (3.0 / 2.5)));
    assert_relative_eq!(hits[0].score, expected, epsilon = 1e-5);
    assert_eq!(hits[0].source, SourceKind::Lexical);
}

#[test]
fn zero_overlap_chunks_are_excluded() {
    let hits = lexical_search(&corpus(), "rent increase", Bm25Params::default());
    assert!(hits.iter().all(|h| h.id.starts_with("d1")));
    assert_eq!(hits[0].id, "d1:0", "chunk with both terms ranks first");
}

#[test]
fn empty_or_punctuation_query_scores_nothing() {
    assert!(lexical_search(&corpus(), "", Bm25Params::default()).is_empty());
    assert!(lexical_search(&corpus(), "?!", Bm25Params::default()).is_empty());
}

#[test]
fn repeated_query_terms_do_not_double_count() {
    let once = lexical_search(&corpus(), "rent", Bm25Params::default());
    let twice = lexical_search(&corpus(), "rent RENT rent?", Bm25Params::default());
    assert_eq!(once, twice);
}

#[test]
fn statistics_are_scoped_to_given_chunks() {
    let all = corpus();
    let scoped = &all[..2];
    // "rent" appears in every scoped chunk, so its idf differs from the full corpus.
    let full = Bm25Index::build(&all, Bm25Params::default());
    let part = Bm25Index::build(scoped, Bm25Params::default());
    assert!(full.idf("rent") > part.idf("rent"));
    assert!(part.idf("rent") > 0.0, "idf stays positive when every chunk matches");
}

#[test]
fn identical_chunks_tie_and_keep_scope_order() {
    let chunks = vec![chunk("a", 0, "rent clause"), chunk("b", 0, "rent clause")];
    let hits = lexical_search(&chunks, "rent", Bm25Params::default());
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].score, hits[1].score);
    assert_eq!(hits[0].id, "a:0");
}

#[test]
fn params_validation() {
    assert!(Bm25Params::new(0.0, 0.75).is_err());
    assert!(Bm25Params::new(1.2, 1.5).is_err());
    assert!(Bm25Params::new(1.5, 0.0).is_ok());
}

#[test]
fn empty_scope_index() {
    let index = Bm25Index::build(&[], Bm25Params::default());
    assert!(index.is_empty());
    assert!(index.search("rent").is_empty());
}
