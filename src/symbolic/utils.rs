// the collection of utility functions for bracket-aware splitting of expressions

/// depth of the bracket nesting after scanning the whole string; 0 for a balanced expression,
/// None as soon as a closing bracket has no opening pair
pub fn bracket_balance(input: &str) -> Option<usize> {
    let mut depth: usize = 0;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    Some(depth)
}

pub fn has_balanced_brackets(input: &str) -> bool {
    bracket_balance(input) == Some(0)
}

/// Split `input` in front of every operator from `operators` found at bracket depth 0.
/// The operator stays with the token it starts, so "3x-sin(x)+1" becomes ["3x", "-sin(x)", "+1"].
/// The first character never starts a new token, so a leading sign belongs to the first term.
/// Expects balanced brackets (see `has_balanced_brackets`).
pub fn split_outside_brackets<'a>(input: &'a str, operators: &[char]) -> Vec<&'a str> {
    let mut tokens = Vec::new();
    let mut bracket_depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' => bracket_depth += 1,
            ')' => bracket_depth = bracket_depth.saturating_sub(1),
            _ if bracket_depth == 0 && i > start && operators.contains(&c) => {
                tokens.push(&input[start..i]);
                start = i;
            }
            _ => {}
        }
    }
    if start < input.len() {
        tokens.push(&input[start..]);
    }
    tokens
}
