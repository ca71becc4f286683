/// Per-character state of the target text against the current input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Untouched,
    Correct,
    Incorrect,
}

/// Result of scoring one input string against the target text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scorecard {
    /// One entry per character of the target text.
    pub statuses: Vec<CharStatus>,
    /// Next index to be typed, if still inside the target.
    pub cursor: Option<usize>,
    pub total_chars: usize,
    pub errors: usize,
    pub correct_chars: usize,
}

impl Scorecard {
    /// Scorecard of a session nobody has typed into yet.
    pub fn untouched(target: &str) -> Self {
        score(target, "")
    }
}

/// Compare `input` against `target` character by character.
///
/// Recomputed from scratch for every input value: calling it twice with the
/// same arguments gives the same scorecard. Input past the end of the target
/// still counts toward `total_chars` but is never compared.
pub fn score(target: &str, input: &str) -> Scorecard {
    let expected: Vec<char> = target.chars().collect();
    let mut statuses = vec![CharStatus::Untouched; expected.len()];
    let mut total_chars = 0;
    let mut errors = 0;

    for (idx, typed) in input.chars().enumerate() {
        total_chars += 1;
        let Some(&want) = expected.get(idx) else {
            continue;
        };
        statuses[idx] = if typed == want {
            CharStatus::Correct
        } else {
            errors += 1;
            CharStatus::Incorrect
        };
    }

    let cursor = (total_chars < statuses.len()).then_some(total_chars);

    Scorecard {
        statuses,
        cursor,
        total_chars,
        errors,
        correct_chars: total_chars.saturating_sub(errors),
    }
}
