//! Approximate substring matching
//!
//! Finds the substring of a field closest to the pattern under optimal string
//! alignment distance (insertions, deletions, substitutions and adjacent
//! transpositions each cost one). The score blends the error rate with how
//! far into the field the match starts, so 0.0 is an exact match at the start.

use std::cmp::Ordering;

use crate::constants::SEARCH_LOCATION_DISTANCE;

/// Best alignment of a pattern within one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMatch {
    pub errors: usize,
    /// Character offset in the field where the match begins
    pub start: usize,
    pub score: f64,
}

/// Lowercased characters, the form both patterns and fields are compared in
pub fn normalize(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Score the best approximate occurrence of `pattern` anywhere in `text`.
/// Both inputs are expected to be [`normalize`]d.
pub fn best_match(pattern: &[char], text: &[char]) -> FieldMatch {
    let m = pattern.len();
    let n = text.len();
    if m == 0 {
        return FieldMatch { errors: 0, start: 0, score: 0.0 };
    }

    // cost[i][j]: fewest edits aligning pattern[..i] with a substring of text
    // ending at j; origin[i][j]: where that substring starts
    let width = n + 1;
    let at = |i: usize, j: usize| i * width + j;
    let mut cost = vec![0usize; (m + 1) * width];
    let mut origin = vec![0usize; (m + 1) * width];

    for j in 0..=n {
        origin[at(0, j)] = j;
    }
    for i in 1..=m {
        cost[at(i, 0)] = i;
        for j in 1..=n {
            let diagonal = at(i - 1, j - 1);
            let mut best = (
                cost[diagonal] + usize::from(pattern[i - 1] != text[j - 1]),
                origin[diagonal],
            );

            let skip_pattern = at(i - 1, j);
            if cost[skip_pattern] + 1 < best.0 {
                best = (cost[skip_pattern] + 1, origin[skip_pattern]);
            }

            let skip_text = at(i, j - 1);
            if cost[skip_text] + 1 < best.0 {
                best = (cost[skip_text] + 1, origin[skip_text]);
            }

            if i > 1 && j > 1 && pattern[i - 1] == text[j - 2] && pattern[i - 2] == text[j - 1] {
                let swapped = at(i - 2, j - 2);
                if cost[swapped] + 1 < best.0 {
                    best = (cost[swapped] + 1, origin[swapped]);
                }
            }

            cost[at(i, j)] = best.0;
            origin[at(i, j)] = best.1;
        }
    }

    (0..=n)
        .map(|j| {
            let errors = cost[at(m, j)];
            let start = origin[at(m, j)];
            FieldMatch {
                errors,
                start,
                score: errors as f64 / m as f64 + start as f64 / SEARCH_LOCATION_DISTANCE,
            }
        })
        .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal))
        .unwrap_or(FieldMatch { errors: m, start: 0, score: 1.0 })
}
