//! Levenshtein-based "did you mean" matching and identifier checks.

/// Closest candidate to `input`, ignoring case. `None` when even the best
/// candidate differs in more than half of the longer string.
pub fn fuzzy_match<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        let dist = levenshtein(&input_lower, &candidate.to_lowercase());
        match best {
            None => best = Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => best = Some((candidate, dist)),
            _ => {}
        }
    }

    best.and_then(|(name, dist)| {
        let max_len = input.chars().count().max(name.chars().count());
        if dist <= max_len / 2 {
            Some(name)
        } else {
            None
        }
    })
}

/// Append `" (did you mean 'x'?)"` when a close candidate exists.
pub fn with_suggestion<'a, I>(message: String, input: &str, candidates: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    match fuzzy_match(input, candidates) {
        Some(s) => format!("{message} (did you mean '{s}'?)"),
        None => message,
    }
}

/// Levenshtein edit distance between two strings.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let m = a.len();
    let n = b.len();

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`
pub fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars().all(|c| c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit())
}
