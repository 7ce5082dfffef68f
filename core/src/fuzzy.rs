use crate::cache::Memo;

pub const DEFAULT_THRESHOLD: usize = 3;

/// Unit-cost Levenshtein distance over Unicode scalar values.
///
/// Uses a single rolling row sized by the shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(lc != sc);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }
    row[short.len()]
}

/// Threshold-based term matcher with a memoized distance table.
pub struct FuzzyMatcher {
    threshold: usize,
    distances: Memo<(String, String), usize>,
}

impl FuzzyMatcher {
    pub fn new(threshold: usize, capacity: usize) -> Self {
        Self { threshold: threshold.max(1), distances: Memo::new(capacity) }
    }

    pub fn threshold(&self) -> usize { self.threshold }

    /// Memoized distance; `(a, b)` and `(b, a)` share one entry.
    pub fn distance(&self, a: &str, b: &str) -> usize {
        if a == b {
            return 0;
        }
        let key = if a <= b { (a.to_string(), b.to_string()) } else { (b.to_string(), a.to_string()) };
        if let Some(d) = self.distances.get(&key) {
            return d;
        }
        let d = levenshtein(a, b);
        self.distances.insert(key, d);
        d
    }

    /// True when the terms are within the threshold. Pairs whose lengths differ
    /// by the threshold or more are rejected without computing a distance.
    pub fn is_match(&self, a: &str, b: &str) -> bool {
        let (la, lb) = (a.chars().count(), b.chars().count());
        if la.abs_diff(lb) >= self.threshold {
            return false;
        }
        self.distance(a, b) < self.threshold
    }

    pub(crate) fn memo(&self) -> &Memo<(String, String), usize> { &self.distances }
}

impl Default for FuzzyMatcher {
    fn default() -> Self { Self::new(DEFAULT_THRESHOLD, 4096) }
}
