//! Character-level similarity scores in the range 0-100.
//!
//! Both scores are case-sensitive; callers lower-case their input first.

/// Similarity based on the matching blocks of a greedy longest-common-substring
/// alignment: `round(200 * matched / (len(a) + len(b)))`.
///
/// Two empty strings are identical and score 100.
#[must_use]
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }

    // The greedy alignment breaks ties by position, so run it both ways
    let matched = matched_chars(&a, &b).max(matched_chars(&b, &a));
    percentage(matched, total)
}

/// `ratio` of the two strings after sorting their whitespace-separated tokens,
/// which makes the score independent of word order.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Rounded `200 * matched / total`; exact halves go to the even neighbour
#[inline]
fn percentage(matched: usize, total: usize) -> u8 {
    let quotient = 200 * matched / total;
    let remainder = 200 * matched % total;

    let round_up = match (2 * remainder).cmp(&total) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => quotient % 2 == 1,
        std::cmp::Ordering::Less => false,
    };
    let scaled = quotient + usize::from(round_up);

    #[allow(clippy::cast_possible_truncation)] // matched <= total / 2, so scaled <= 100
    {
        scaled.min(100) as u8
    }
}

/// Total length of the matching blocks between `a` and `b`.
///
/// Finds the longest common substring, then recurses into the unmatched
/// regions on either side of it.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;

        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    total
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(start_in_a, start_in_b, length)`; among equally long matches the
/// one starting earliest in `a`, then earliest in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);

    // prev[k] = length of the common suffix ending at (i - 1, blo + k)
    let mut prev = vec![0usize; width];
    let mut curr = vec![0usize; width];

    for i in alo..ahi {
        for k in 0..width {
            curr[k] = if a[i] == b[blo + k] {
                if k > 0 {
                    prev[k - 1] + 1
                } else {
                    1
                }
            } else {
                0
            };

            let len = curr[k];
            if len > best.2 {
                best = (i + 1 - len, blo + k + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
