use calcflow_core::{Arg, CalcError, Operation};

use super::lexer::{is_valid_in_number, Piece};
use super::Compiler;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Token {
    Operand(Arg),
    Op(Operation),
}

impl Compiler {
    /// Split a bracket-free level into alternating operands and operators.
    pub(super) fn tokenize(&mut self, pieces: &[Piece]) -> Result<Vec<Token>, CalcError> {
        let mut tokens = Vec::new();
        let mut number = String::new();
        // Operand of a compiled group, with any sign still held in `number`.
        let mut group: Option<Arg> = None;

        for piece in pieces {
            match *piece {
                Piece::Char(c) if group.is_none() && is_valid_in_number(&number, c) => {
                    number.push(c);
                }
                Piece::Char(c) => {
                    let Some(operation) = Operation::from_char(c) else {
                        return Err(CalcError::invalid(format!("unexpected character '{}'", c)));
                    };
                    let operand = self.finish_operand(&mut number, group.take())?;
                    tokens.push(Token::Operand(operand));
                    tokens.push(Token::Op(operation));
                }
                Piece::Operand(arg) => {
                    if group.is_some() || !is_sign_only(&number) {
                        return Err(CalcError::invalid("missing operator before '('"));
                    }
                    group = Some(arg);
                }
            }
        }

        let operand = self.finish_operand(&mut number, group.take())?;
        tokens.push(Token::Operand(operand));
        Ok(tokens)
    }

    /// Close the operand being built, clearing `number`.
    fn finish_operand(&mut self, number: &mut String, group: Option<Arg>) -> Result<Arg, CalcError> {
        let text = std::mem::take(number);
        match group {
            Some(arg) if text == "-" => self.negate(arg),
            Some(arg) => Ok(arg),
            None => parse_number(&text).map(Arg::Literal),
        }
    }

    fn negate(&mut self, arg: Arg) -> Result<Arg, CalcError> {
        match arg {
            Arg::Literal(v) => Ok(Arg::Literal(-v)),
            Arg::TaskRef(_) => self.emit(Arg::Literal(0.0), Operation::Subtract, arg),
        }
    }

    /// Reduce alternating tokens to one operand, emitting a task per operator.
    pub(super) fn linearize(&mut self, mut tokens: Vec<Token>) -> Result<Arg, CalcError> {
        loop {
            let position = find_operator(&tokens, |op| op.is_multiplicative())
                .or_else(|| find_operator(&tokens, |op| !op.is_multiplicative()));
            let Some(i) = position else { break };

            let (Some(Token::Operand(lhs)), Some(Token::Op(operation)), Some(Token::Operand(rhs))) = (
                i.checked_sub(1).and_then(|l| tokens.get(l)).copied(),
                tokens.get(i).copied(),
                tokens.get(i + 1).copied(),
            ) else {
                return Err(CalcError::Internal(format!("operator at {} lacks operands", i)));
            };

            let placeholder = self.emit(lhs, operation, rhs)?;
            tokens[i - 1] = Token::Operand(placeholder);
            tokens.drain(i..=i + 1);
        }

        match tokens.as_slice() {
            [Token::Operand(arg)] => Ok(*arg),
            _ => Err(CalcError::Internal("token stream did not reduce".to_string())),
        }
    }
}

fn find_operator(tokens: &[Token], pred: impl Fn(Operation) -> bool) -> Option<usize> {
    tokens
        .iter()
        .position(|t| matches!(t, Token::Op(op) if pred(*op)))
}

fn is_sign_only(text: &str) -> bool {
    matches!(text, "" | "+" | "-")
}

fn parse_number(text: &str) -> Result<f64, CalcError> {
    if is_sign_only(text) {
        return Err(CalcError::invalid("missing operand"));
    }
    if text.ends_with('.') {
        return Err(CalcError::invalid(format!("number '{}' ends with a decimal point", text)));
    }
    let value = text
        .parse::<f64>()
        .map_err(|e| CalcError::Internal(format!("cannot parse number '{}': {}", text, e)))?;
    if !value.is_finite() {
        return Err(CalcError::invalid(format!("number with {} digits is out of range", text.len())));
    }
    Ok(value)
}
