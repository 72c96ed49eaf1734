use super::super::*;

/// Observes the parser as it builds a tree.
pub trait Trace {
    fn group(&mut self, _left: &Expr, _operator: Operator, _right: &Expr) {}

    fn expression(&mut self, _expr: &Expr) {}

    /// Tokens left over after the root expression was complete.
    fn remaining(&mut self, _tokens: &[Token]) {}
}

/// Forwards parse events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTrace;

impl Trace for LogTrace {
    fn group(&mut self, left: &Expr, operator: Operator, right: &Expr) {
        log::trace!("L:{} OP:{} R:{}", left, operator, right);
    }

    fn expression(&mut self, expr: &Expr) {
        log::debug!("EXPR: {}", expr);
    }

    fn remaining(&mut self, tokens: &[Token]) {
        log::warn!(
            "ignoring {} trailing token(s): {}",
            tokens.len(),
            tokens
                .iter()
                .map(|t| format!("{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl Trace for NoTrace {}
