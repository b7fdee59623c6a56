use calcflow_core::{Arg, CalcError, Operation};

/// One element of a bracket-free expression: a raw character, or the operand
/// a parenthesised group compiled to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Piece {
    Char(char),
    Operand(Arg),
}

/// Whether `c` may extend the number token built so far.
///
/// Digits always extend a token. A decimal point is allowed once and never
/// first. A sign is allowed only as the first character.
pub fn is_valid_in_number(token: &str, c: char) -> bool {
    match c {
        '.' => !token.is_empty() && !token.contains('.'),
        '+' | '-' => token.is_empty(),
        _ => c.is_ascii_digit(),
    }
}

pub fn is_valid_operation(c: char) -> bool {
    Operation::from_char(c).is_some()
}

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

/// True when the text holds three or more consecutive `+`/`-` characters.
pub fn has_long_sign_run(text: &str) -> bool {
    let mut run = 0;
    for c in text.chars() {
        if is_sign(c) {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Collapse adjacent signs: `--` → `+`, `+-` → `-`, `-+` → `-`, `++` → `+`.
pub fn normalize_signs(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut out: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if let Piece::Char(c) = piece {
            if is_sign(c) {
                if let Some(Piece::Char(prev)) = out.last_mut() {
                    if is_sign(*prev) {
                        *prev = if *prev == c { '+' } else { '-' };
                        continue;
                    }
                }
            }
        }
        out.push(piece);
    }
    out
}

/// Reject runs of two or more operators, except a multiplicative operator
/// followed by a single sign (`2*-3`), which is the sign of the next number.
pub fn check_operator_runs(pieces: &[Piece]) -> Result<(), CalcError> {
    let mut run = String::new();
    for piece in pieces.iter().chain(std::iter::once(&Piece::Char(' '))) {
        match piece {
            Piece::Char(c) if is_valid_operation(*c) => run.push(*c),
            _ => {
                if !is_acceptable_run(&run) {
                    return Err(CalcError::invalid(format!("malformed operator sequence '{}'", run)));
                }
                run.clear();
            }
        }
    }
    Ok(())
}

fn is_acceptable_run(run: &str) -> bool {
    let chars: Vec<char> = run.chars().collect();
    match chars.as_slice() {
        [] | [_] => true,
        [first, second] => (*first == '*' || *first == '/') && is_sign(*second),
        _ => false,
    }
}
