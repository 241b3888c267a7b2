//! Scoring shared by every index backend
//!
//! Backends only expose raw postings and a corpus size; ranking happens here so
//! all backends score identically.

use crate::index::{Posting, SearchHit};
use std::cmp::Ordering;

/// Orders hits by descending score, then descending URL
pub fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.url.cmp(&a.url))
}

pub fn sort_hits(hits: &mut [SearchHit]) {
    hits.sort_by(compare_hits);
}

/// Term-frequency ranking: `score = tf = count / doc_length`
pub fn tf_hits(postings: &[Posting]) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = postings
        .iter()
        .filter(|p| p.doc_length > 0)
        .map(|p| {
            let tf = p.count as f64 / p.doc_length as f64;
            SearchHit {
                url: p.url.clone(),
                tf,
                idf: 0.0,
                score: tf,
            }
        })
        .collect();
    sort_hits(&mut hits);
    hits
}

/// TF-IDF ranking over one term's postings
///
/// `idf = ln(total_docs / (df + 1))` where `df` is the number of postings.
/// The smoothing makes `idf` negative once a term appears in every document
/// (and zero when it appears in all but one); scores are not clamped.
pub fn compute_tfidf(postings: &[Posting], total_docs: usize) -> Vec<SearchHit> {
    if postings.is_empty() || total_docs == 0 {
        return Vec::new();
    }

    let df = postings.len();
    let idf = (total_docs as f64 / (df + 1) as f64).ln();

    let mut hits: Vec<SearchHit> = postings
        .iter()
        .filter(|p| p.doc_length > 0)
        .map(|p| {
            let tf = p.count as f64 / p.doc_length as f64;
            SearchHit {
                url: p.url.clone(),
                tf,
                idf,
                score: tf * idf,
            }
        })
        .collect();
    sort_hits(&mut hits);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(url: &str, count: u64, doc_length: u64) -> Posting {
        Posting {
            url: url.to_string(),
            count,
            doc_length,
        }
    }

    #[test]
    fn test_tfidf_formula() {
        let postings = vec![posting("https://x.org/a", 2, 3)];
        let hits = compute_tfidf(&postings, 10);

        assert_eq!(hits.len(), 1);
        let expected_idf = (10.0f64 / 2.0).ln();
        assert!((hits[0].tf - 2.0 / 3.0).abs() < 1e-12);
        assert!((hits[0].idf - expected_idf).abs() < 1e-12);
        assert!((hits[0].score - 2.0 / 3.0 * expected_idf).abs() < 1e-12);
    }

    #[test]
    fn test_negative_idf_is_kept() {
        let postings = vec![posting("https://x.org/a", 1, 4), posting("https://x.org/b", 1, 2)];
        let hits = compute_tfidf(&postings, 2);

        assert!(hits.iter().all(|h| h.idf < 0.0));
        assert!(hits.iter().all(|h| h.score < 0.0));
        // the shorter document has the larger tf, so the more negative score
        assert_eq!(hits[0].url, "https://x.org/a");
    }

    #[test]
    fn test_empty_inputs_give_no_hits() {
        assert!(compute_tfidf(&[], 5).is_empty());
        assert!(compute_tfidf(&[posting("https://x.org/a", 1, 1)], 0).is_empty());
        assert!(tf_hits(&[]).is_empty());
    }

    #[test]
    fn test_zero_length_documents_skipped() {
        let postings = vec![posting("https://x.org/a", 1, 0), posting("https://x.org/b", 1, 5)];
        let hits = compute_tfidf(&postings, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://x.org/b");
    }

    #[test]
    fn test_ties_broken_by_descending_url() {
        let postings = vec![
            posting("https://x.org/a", 1, 2),
            posting("https://x.org/c", 1, 2),
            posting("https://x.org/b", 1, 2),
            posting("https://x.org/z", 2, 2),
        ];
        let hits = tf_hits(&postings);
        let urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://x.org/z", "https://x.org/c", "https://x.org/b", "https://x.org/a"]
        );
    }

    #[test]
    fn test_hits_strictly_ordered() {
        let postings: Vec<Posting> = (0..20)
            .map(|i| posting(&format!("https://x.org/{:02}", i), (i % 4) + 1, 5))
            .collect();
        let hits = compute_tfidf(&postings, 100);

        for pair in hits.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.score > b.score || (a.score == b.score && a.url > b.url));
        }
    }

    #[test]
    fn test_tf_hits_have_no_idf() {
        let hits = tf_hits(&[posting("https://x.org/a", 1, 4)]);
        assert_eq!(hits[0].idf, 0.0);
        assert_eq!(hits[0].score, 0.25);
    }
}
