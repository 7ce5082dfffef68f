//! Suffix-stripping stemmer.
//!
//! A token goes through a fixed sequence of rewrites: plural endings,
//! past/participle endings, a terminal `y`, one pass over [`REPLACEMENTS`]
//! and, if nothing there matched, one pass over [`SUFFIXES`]. Both tables are
//! scanned in declaration order and the first match wins, so reordering them
//! changes the output for overlapping suffixes.

/// Suffix rewrites; the first entry whose suffix ends the word is applied and
/// stemming stops.
pub const REPLACEMENTS: &[(&str, &str)] = &[
    ("ational", "ate"), ("tional", "tion"), ("enci", "ence"), ("anci", "ance"),
    ("izer", "ize"), ("abli", "able"), ("alli", "al"), ("entli", "ent"),
    ("eli", "e"), ("ousli", "ous"), ("ization", "ize"), ("ation", "ate"),
    ("ator", "ate"), ("alism", "al"), ("iveness", "ive"), ("fulness", "ful"),
    ("ousness", "ous"), ("aliti", "al"), ("iviti", "ive"), ("biliti", "ble"),
    ("logi", "log"), ("icate", "ic"), ("ative", ""), ("alize", "al"),
    ("iciti", "ic"), ("ical", "ic"), ("ful", ""), ("ness", "ness"),
    ("ability", "able"), ("ibility", "ible"), ("ition", "ite"), ("ality", "al"),
    ("ivity", "ive"), ("ment", "ment"), ("ship", "ship"), ("sion", "sion"),
    ("tion", "tion"), ("ance", "ance"), ("ence", "ence"), ("hood", ""),
    ("ism", "ism"), ("ist", "ist"), ("ity", "ity"), ("th", "th"),
    ("ese", "ese"), ("ize", "ize"), ("ise", "ise"),
];

/// Bare suffixes stripped without replacement when no rewrite applied.
pub const SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement",
    "ment", "ent", "sion", "tion", "ou", "ism", "ate", "iti", "ous",
    "ive", "ize", "ship", "ness", "hood", "less", "wise", "ful", "ward",
    "dom", "ity", "ness", "ment", "ist", "alism", "ization", "ation",
    "ator", "iveness", "fulness", "ousness", "alist", "ivity", "ency",
    "ancy", "ility", "nesses", "ations", "izers", "atives", "ments",
    "ances", "ences", "ists", "isms", "nesses", "ities", "ives", "izes", "ous",
];

fn is_vowel(c: char) -> bool { matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') }

fn last_chars<const N: usize>(word: &str) -> Option<[char; N]> {
    let mut out = ['\0'; N];
    let mut chars = word.chars().rev();
    for slot in out.iter_mut().rev() {
        *slot = chars.next()?;
    }
    Some(out)
}

fn replace_suffix(word: &mut String, suffix: &str, replacement: &str) {
    word.truncate(word.len() - suffix.len());
    word.push_str(replacement);
}

fn strip_plural(word: &mut String) {
    if word.ends_with("sses") {
        replace_suffix(word, "sses", "ss");
    } else if word.ends_with("ies") {
        replace_suffix(word, "ies", "ss");
    } else if let Some([prev, 's']) = last_chars::<2>(word) {
        if prev != 's' {
            word.pop();
        }
    }
}

fn strip_participle(word: &mut String) {
    if let Some(suffix) = ["eedly", "eed"].into_iter().find(|s| word.ends_with(s)) {
        replace_suffix(word, suffix, "ee");
        return;
    }
    let Some(suffix) = ["edly", "ed", "ingly", "ing"].into_iter().find(|s| word.ends_with(s)) else {
        return;
    };
    word.truncate(word.len() - suffix.len());
    if ["at", "bl", "iz"].iter().any(|s| word.ends_with(s)) {
        word.push('e');
    } else if ends_with_double_consonant(word) {
        word.pop();
    } else if ends_with_cvc(word) {
        word.push('e');
    }
}

// Doubled letter other than a vowel, y, l, s or z.
fn ends_with_double_consonant(word: &str) -> bool {
    matches!(last_chars::<2>(word), Some([a, b]) if a == b && !is_vowel(b) && !matches!(b, 'y' | 'l' | 's' | 'z'))
}

// Consonant, vowel (or y), then a consonant that is not w, x or y.
fn ends_with_cvc(word: &str) -> bool {
    matches!(
        last_chars::<3>(word),
        Some([c1, v, c2]) if !is_vowel(c1) && (is_vowel(v) || v == 'y') && !is_vowel(c2) && !matches!(c2, 'w' | 'x' | 'y')
    )
}

/// Reduce a single token to its root form. Case-insensitive; the result is lowercase.
pub fn stem(token: &str) -> String {
    let mut word = token.to_lowercase();

    strip_plural(&mut word);
    strip_participle(&mut word);

    if word.ends_with('y') {
        word.pop();
        word.push('i');
    }

    if let Some((suffix, replacement)) = REPLACEMENTS.iter().find(|(s, _)| word.ends_with(s)) {
        replace_suffix(&mut word, suffix, replacement);
        return word;
    }

    if let Some(suffix) = SUFFIXES.iter().find(|s| word.ends_with(*s)) {
        word.truncate(word.len() - suffix.len());
        return word;
    }

    if word.ends_with('e') {
        word.pop();
    }
    if word.ends_with("ll") {
        word.pop();
    }
    word
}
