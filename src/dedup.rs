use tracing::debug;

use crate::paper::Paper;

/// Title similarity at or above this ratio marks a paper as a duplicate.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.9;

/// Similarity ratio between two titles, in `[0, 1]`.
///
/// Computed as `2 * LCS(a, b) / (|a| + |b|)` over the lower-cased char
/// sequences: 1.0 for identical strings (including two empty ones), 0.0
/// when no characters can be aligned. Symmetric and deterministic.
pub fn title_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let matches = longest_common_subsequence(&a, &b);
    (2 * matches) as f32 / (a.len() + b.len()) as f32
}

/// Length of the longest common subsequence, two-row dynamic programming.
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Drop papers whose title is a near-duplicate of an earlier one.
///
/// Scans in input order, keeping a list of accepted titles; a paper whose
/// title reaches `threshold` similarity against any accepted title is
/// discarded. First-seen wins, and the kept papers retain their relative
/// order. O(n²) in the input length, which is bounded by the over-fetch
/// size.
pub fn deduplicate(papers: Vec<Paper>, threshold: f32) -> Vec<Paper> {
    let total = papers.len();
    let mut unique: Vec<Paper> = Vec::with_capacity(total);

    for paper in papers {
        let duplicate_of = unique
            .iter()
            .find(|kept| title_similarity(&paper.title, &kept.title) >= threshold);

        match duplicate_of {
            Some(kept) => {
                debug!(
                    dropped = %paper.title,
                    kept = %kept.title,
                    "dropping near-duplicate title"
                );
            }
            None => unique.push(paper),
        }
    }

    debug!(before = total, after = unique.len(), "deduplicated papers");
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str) -> Paper {
        Paper {
            title: title.to_string(),
            ..Paper::empty()
        }
    }

    fn titles(papers: &[Paper]) -> Vec<&str> {
        papers.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(title_similarity("deep learning", "deep learning"), 1.0);
        assert_eq!(title_similarity("", ""), 1.0);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(title_similarity("Deep Learning", "DEEP LEARNING"), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(title_similarity("abc", "xyz"), 0.0);
        assert_eq!(title_similarity("abc", ""), 0.0);
    }

    #[test]
    fn ratio_is_symmetric() {
        let pairs = [
            ("Deep Learning for NLP", "Deep Learning for NLP."),
            ("attention is all you need", "attention was all we needed"),
            ("short", "a much longer unrelated title"),
        ];
        for (a, b) in pairs {
            assert_eq!(title_similarity(a, b), title_similarity(b, a));
        }
    }

    #[test]
    fn trailing_punctuation_is_near_identical() {
        let ratio =
            title_similarity("Deep Learning for NLP", "Deep Learning for NLP.");
        assert!(ratio >= DEFAULT_SIMILARITY_THRESHOLD, "ratio was {ratio}");
        assert!(ratio < 1.0);
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(deduplicate(Vec::new(), DEFAULT_SIMILARITY_THRESHOLD).is_empty());
    }

    #[test]
    fn near_duplicates_collapse_first_wins() {
        let papers = vec![
            paper("Deep Learning for NLP"),
            paper("Deep Learning for NLP."),
            paper("Cooking Recipes"),
        ];
        let kept = deduplicate(papers, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(titles(&kept), vec!["Deep Learning for NLP", "Cooking Recipes"]);
    }

    #[test]
    fn identical_titles_collapse_at_any_threshold() {
        for threshold in [0.1, 0.5, 0.9, 1.0] {
            let papers = vec![paper("Same Title"), paper("same title")];
            let kept = deduplicate(papers, threshold);
            assert_eq!(kept.len(), 1, "threshold {threshold}");
        }
    }

    #[test]
    fn exact_threshold_counts_as_duplicate() {
        let a = "abcde";
        let b = "abcd";
        let ratio = title_similarity(a, b);
        let papers = vec![paper(a), paper(b)];
        let kept = deduplicate(papers, ratio);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn output_is_order_preserving_subsequence() {
        let papers = vec![
            paper("Graph Neural Networks"),
            paper("Quantum Error Correction"),
            paper("Graph Neural Networks!"),
            paper("Protein Folding"),
        ];
        let kept = deduplicate(papers, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(
            titles(&kept),
            vec![
                "Graph Neural Networks",
                "Quantum Error Correction",
                "Protein Folding"
            ]
        );
    }

    #[test]
    fn never_increases_count() {
        for threshold in [0.0, 0.3, 0.9, 1.0] {
            let papers = vec![
                paper("alpha beta"),
                paper("alpha beta gamma"),
                paper("delta"),
            ];
            let kept = deduplicate(papers.clone(), threshold);
            assert!(kept.len() <= papers.len());
        }
    }

    #[test]
    fn idempotent_on_own_output() {
        let papers = vec![
            paper("Transformers for Vision"),
            paper("Transformers for Vision Tasks"),
            paper("Bayesian Optimization"),
            paper("bayesian optimisation"),
        ];
        let once = deduplicate(papers, DEFAULT_SIMILARITY_THRESHOLD);
        let twice = deduplicate(once.clone(), DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(titles(&once), titles(&twice));
    }
}
