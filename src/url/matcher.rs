/// Checks if a string matches a shell-style glob pattern
///
/// Semantics follow classic `fnmatch` on POSIX systems:
/// - `*` matches any run of characters, including `/`
/// - `?` matches exactly one character
/// - `[seq]` matches one character in `seq`, `[!seq]` one character not in it
/// - `a-z` inside a class is an inclusive range
/// - an unterminated `[` is a literal bracket
///
/// Matching is case sensitive and anchored at both ends.
///
/// # Examples
///
/// ```
/// use review_harvest::url::matches_glob;
///
/// assert!(matches_glob("*/album-reviews/*", "/album-reviews/some-record"));
/// assert!(matches_glob("*/album-reviews/*", "https://site.test/album-reviews/x"));
/// assert!(!matches_glob("*/album-reviews/*", "/album-reviews"));
/// ```
pub fn matches_glob(pattern: &str, candidate: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let s: Vec<char> = candidate.chars().collect();

    let mut pi = 0;
    let mut si = 0;
    // Position after the last `*` and the candidate index it is anchored at
    let mut backtrack: Option<(usize, usize)> = None;

    while si < s.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    backtrack = Some((pi + 1, si));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    si += 1;
                    continue;
                }
                '[' => match match_class(&p, pi, s[si]) {
                    Some((true, next)) => {
                        pi = next;
                        si += 1;
                        continue;
                    }
                    Some((false, _)) => {}
                    None => {
                        if s[si] == '[' {
                            pi += 1;
                            si += 1;
                            continue;
                        }
                    }
                },
                c if c == s[si] => {
                    pi += 1;
                    si += 1;
                    continue;
                }
                _ => {}
            }
        }

        match backtrack {
            Some((star_pi, star_si)) => {
                pi = star_pi;
                si = star_si + 1;
                backtrack = Some((star_pi, star_si + 1));
            }
            None => return false,
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }

    pi == p.len()
}

/// Matches `c` against the bracket class starting at `p[start] == '['`
///
/// Returns whether the character matched and the index just past the
/// closing bracket, or `None` when the class is never closed.
fn match_class(p: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let mut negate = false;
    if i < p.len() && p[i] == '!' {
        negate = true;
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    loop {
        if i >= p.len() {
            return None;
        }
        // A leading `]` is part of the set
        if p[i] == ']' && !first {
            break;
        }
        first = false;

        if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            if p[i] <= c && c <= p[i + 2] {
                matched = true;
            }
            i += 3;
        } else {
            if p[i] == c {
                matched = true;
            }
            i += 1;
        }
    }

    Some((matched != negate, i + 1))
}
