use std::collections::HashMap;

/// Ratcliff/Obershelp similarity over Unicode scalar values.
///
/// `2·M / (|a| + |b|)` where M counts characters in the matching blocks
/// found by repeatedly taking the longest common block and recursing on
/// both sides of it. Identical strings (two empty strings included) score
/// 1.0; strings with no shared character score 0.0.
///
/// Comparison is case-insensitive: both sides are lowercased first, so
/// an all-caps certificate still scores against a mixed-case roster.
///
/// Longest-block ties resolve to the earliest block in `a`, so a single
/// pass is order-dependent. Both directions are scored and the larger
/// value returned, which makes `ratio(a, b) == ratio(b, a)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();
    directed_ratio(&a, &b).max(directed_ratio(&b, &a))
}

fn directed_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(a, b) as f64 / total as f64
}

/// Total size of the matching blocks between `a` and `b`.
pub fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as
/// `(start_a, start_b, len)`. Earliest in `a` wins ties, then earliest in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // Length of the match ending at (i - 1, j), keyed by j.
    let mut run_at: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_run: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run.insert(j, k);
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        run_at = next_run;
    }

    (best_i, best_j, best_len)
}
