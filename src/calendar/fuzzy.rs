//! Approximate text matching for the calendar search box.
//!
//! Similarity is the overlap coefficient of padded character trigrams, with
//! case-insensitive substring containment shorting to a perfect score. Scores
//! range over [0, 1]; callers gate on a threshold (lower admits more) and get
//! survivors ranked best match first.

use std::collections::HashSet;

/// Filter and rank `items` by how well any extracted field matches `query`.
///
/// Each extractor pulls one searchable string out of an item; missing fields
/// simply contribute nothing. Items whose best field score is below
/// `threshold` are dropped; the rest are ordered by descending score, with
/// ties keeping their original relative order.
pub fn rank_by_similarity<T>(items: Vec<T>, query: &str, extractors: &[fn(&T) -> Option<&str>], threshold: f32) -> Vec<T> {
    let mut scored: Vec<(f32, T)> = items
        .into_iter()
        .filter_map(|item| {
            let score = extractors
                .iter()
                .filter_map(|extract| extract(&item).map(|text| similarity(query, text)))
                .fold(0.0_f32, f32::max);
            (score >= threshold).then_some((score, item))
        })
        .collect();

    // sort_by is stable, so equal scores preserve input order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, item)| item).collect()
}

/// Similarity of `query` against `text` in [0, 1].
pub fn similarity(query: &str, text: &str) -> f32 {
    let query = query.to_lowercase();
    let text = text.to_lowercase();
    if query.is_empty() || text.is_empty() {
        return 0.0;
    }
    if text.contains(&query) {
        return 1.0;
    }

    let query_grams = trigrams(&query);
    let text_grams = trigrams(&text);
    let shorter = query_grams.len().min(text_grams.len());
    if shorter == 0 {
        return 0.0;
    }

    let shared = query_grams.intersection(&text_grams).count();
    shared as f32 / shorter as f32
}

// Padded like pg_trgm: two leading and one trailing space, so word starts
// carry more weight than word interiors.
fn trigrams(s: &str) -> HashSet<(char, char, char)> {
    let padded: Vec<char> = "  ".chars().chain(s.chars()).chain(" ".chars()).collect();
    padded.windows(3).map(|w| (w[0], w[1], w[2])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_is_a_perfect_match() {
        assert_eq!(similarity("tran", "Transport to Malmö"), 1.0);
        assert_eq!(similarity("MALMÖ", "Transport to Malmö"), 1.0);
    }

    #[test]
    fn test_transposition_still_scores_high() {
        let score = similarity("transprot", "Transport");
        assert!(score >= 0.3, "got {score}");
    }

    #[test]
    fn test_unrelated_strings_score_low() {
        let score = similarity("forklift", "Crew assignment");
        assert!(score < 0.3, "got {score}");
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert_eq!(similarity("", "anything"), 0.0);
        assert_eq!(similarity("anything", ""), 0.0);
    }

    #[test]
    fn test_rank_orders_best_match_first() {
        let items: Vec<String> = ["Crew assignment", "Transporter", "Transport"].map(String::from).to_vec();
        let extractors: [fn(&String) -> Option<&str>; 1] = [|s| Some(s.as_str())];
        let ranked = rank_by_similarity(items, "transport", &extractors, 0.3);
        // Both transports contain the query; the tie keeps input order and
        // the unrelated entry is dropped
        assert_eq!(ranked, vec!["Transporter".to_string(), "Transport".to_string()]);
    }

    #[test]
    fn test_rank_skips_items_with_no_extractable_text() {
        let items: Vec<Option<String>> = vec![None, Some("Transport".to_string())];
        let extractors: [fn(&Option<String>) -> Option<&str>; 1] = [|s| s.as_deref()];
        let ranked = rank_by_similarity(items, "transport", &extractors, 0.3);
        assert_eq!(ranked, vec![Some("Transport".to_string())]);
    }
}
