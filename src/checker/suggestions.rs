use crate::checker::dictionary::Dictionary;

/// Candidates further than this from the misspelled word are never offered.
const MAX_DISTANCE: usize = 2;

/// Generate replacement candidates for a misspelled word, closest first.
pub fn generate(word: &str, dictionary: &Dictionary, max_suggestions: usize) -> Vec<String> {
    if max_suggestions == 0 || word.is_empty() {
        return Vec::new();
    }

    let mut ranked = Ranked::new(word, max_suggestions);

    // 1. Single-edit variants that are real words (cheap, catches most typos)
    for candidate in single_edits(word) {
        if dictionary.contains(&candidate) {
            ranked.offer(candidate);
        }
    }

    // 2. Words sharing a prefix, progressively shorter so short words still match
    for prefix_len in [3, 2] {
        if ranked.is_full() {
            break;
        }
        let Some(prefix) = char_prefix(word, prefix_len) else {
            continue;
        };
        for candidate in dictionary.with_prefix(prefix) {
            ranked.offer(candidate);
        }
    }

    // 3. Full scan, only for very short words where prefixes say little
    if !ranked.is_full() && word.chars().count() <= 3 {
        let len = word.chars().count();
        for candidate in dictionary.words() {
            if candidate.chars().count().abs_diff(len) <= 1 {
                ranked.offer(candidate);
            }
        }
    }

    ranked.into_vec()
}

/// Candidates ordered by edit distance, then by discovery order.
struct Ranked<'a> {
    word: &'a str,
    limit: usize,
    found: Vec<(usize, usize, String)>,
}

impl<'a> Ranked<'a> {
    fn new(word: &'a str, limit: usize) -> Self {
        Self {
            word,
            limit,
            found: Vec::new(),
        }
    }

    fn offer(&mut self, candidate: String) {
        if candidate == self.word || self.found.iter().any(|(_, _, c)| *c == candidate) {
            return;
        }
        let distance = edit_distance(self.word, &candidate);
        if distance <= MAX_DISTANCE {
            let order = self.found.len();
            self.found.push((distance, order, candidate));
        }
    }

    fn is_full(&self) -> bool {
        self.found.iter().filter(|(d, _, _)| *d == 1).count() >= self.limit
    }

    fn into_vec(mut self) -> Vec<String> {
        self.found.sort_by_key(|(distance, order, _)| (*distance, *order));
        self.found.truncate(self.limit);
        self.found.into_iter().map(|(_, _, c)| c).collect()
    }
}

fn char_prefix(word: &str, chars: usize) -> Option<&str> {
    match word.char_indices().nth(chars) {
        Some((end, _)) => Some(&word[..end]),
        None if word.chars().count() == chars => Some(word),
        None => None,
    }
}

/// Calculate Levenshtein distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(previous[j] + cost); // substitution
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Deletions, adjacent transpositions and common letter confusions.
fn single_edits(word: &str) -> Vec<String> {
    let mut edits = Vec::new();
    let chars: Vec<char> = word.chars().collect();

    for i in 0..chars.len() {
        let mut candidate = chars.clone();
        candidate.remove(i);
        edits.push(candidate.iter().collect());
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut candidate = chars.clone();
        candidate.swap(i, i + 1);
        edits.push(candidate.iter().collect());
    }

    let confusions = [
        ('a', 'e'),
        ('e', 'i'),
        ('i', 'o'),
        ('o', 'u'),
        ('b', 'v'),
        ('c', 'k'),
        ('f', 'v'),
        ('g', 'j'),
        ('m', 'n'),
        ('s', 'z'),
        ('t', 'd'),
    ];

    for (i, &ch) in chars.iter().enumerate() {
        for &(from, to) in &confusions {
            let replacement = if ch == from {
                to
            } else if ch == to {
                from
            } else {
                continue;
            };
            let mut candidate = chars.clone();
            candidate[i] = replacement;
            edits.push(candidate.iter().collect());
        }
    }

    edits
}
