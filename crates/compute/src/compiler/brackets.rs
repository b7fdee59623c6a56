use calcflow_core::CalcError;

use super::lexer::{check_operator_runs, has_long_sign_run, normalize_signs, Piece};
use super::Compiler;

impl Compiler {
    /// Compile every top-level parenthesised group of `text` and return the
    /// level as pieces, with each group replaced by its operand.
    ///
    /// Signs are normalised after substitution, so `2--(1)` reads as `2+#n`.
    pub(super) fn resolve_brackets(&mut self, text: &str) -> Result<Vec<Piece>, CalcError> {
        if has_long_sign_run(text) {
            return Err(CalcError::invalid("three or more consecutive signs"));
        }

        let mut pieces = Vec::with_capacity(text.len());
        let mut group = String::new();
        let mut depth: usize = 0;

        for c in text.chars() {
            match c {
                '(' => {
                    if depth > 0 {
                        group.push(c);
                    }
                    depth += 1;
                }
                ')' => {
                    if depth == 0 {
                        return Err(CalcError::invalid("unmatched ')'"));
                    }
                    depth -= 1;
                    if depth == 0 {
                        let operand = self.compile_group(&group)?;
                        group.clear();
                        pieces.push(Piece::Operand(operand));
                    } else {
                        group.push(c);
                    }
                }
                _ if depth > 0 => group.push(c),
                _ => pieces.push(Piece::Char(c)),
            }
        }

        if depth != 0 {
            return Err(CalcError::invalid("unclosed '('"));
        }

        let pieces = normalize_signs(pieces);
        check_operator_runs(&pieces)?;
        Ok(pieces)
    }
}
