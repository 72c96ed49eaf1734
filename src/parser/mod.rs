mod trace;

pub use self::trace::*;

use super::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid token: {}", describe(.0))]
    InvalidToken(Option<Token>),
    #[error("unknown operator: {0}")]
    UnknownOperator(Token),
    #[error("invalid expression: missing closing bracket?")]
    MalformedExpression,
    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(Expr),
    #[error("expression nested deeper than {0} brackets")]
    TooDeep(usize),
}

/// Deepest bracket nesting `parse` accepts. Evaluating, printing and dropping
/// a tree all recurse once per level, so this bounds them too.
pub const MAX_DEPTH: usize = 256;

fn describe(token: &Option<Token>) -> String {
    match *token {
        Some(ref token) => format!("{}", token),
        None => "end of input".to_string(),
    }
}

/// Parses one expression from the start of `tokens`, tracing to `log`.
///
/// Tokens after the first complete expression are ignored.
pub fn parse(tokens: &[Token]) -> Result<Expr, Error> {
    parse_with(tokens, &mut LogTrace)
}

pub fn parse_with(tokens: &[Token], trace: &mut dyn Trace) -> Result<Expr, Error> {
    let mut parser = Parser { tokens, trace };
    let (expr, next) = parser.expr(0, 0)?;
    parser.trace.expression(&expr);
    if next < tokens.len() {
        parser.trace.remaining(&tokens[next..]);
    }
    Ok(expr)
}

struct Parser<'t, 's> {
    tokens: &'t [Token],
    trace: &'s mut dyn Trace,
}

impl<'t, 's> Parser<'t, 's> {
    // Returns the expression starting at `idx` and the index just past it.
    // `depth` counts the brackets already open around it.
    fn expr(&mut self, idx: usize, depth: usize) -> Result<(Expr, usize), Error> {
        let tokens = self.tokens;
        match tokens.get(idx) {
            Some(&Token::Symbol('(')) if depth >= MAX_DEPTH => Err(Error::TooDeep(MAX_DEPTH)),
            Some(&Token::Symbol('(')) => self.group(idx + 1, depth + 1),
            Some(&Token::Number(value)) => Ok((Expr::Literal(value), idx + 1)),
            Some(&Token::Word(ref word)) if Name::is_valid(word) => {
                Ok((Expr::Variable(Name::new(word)), idx + 1))
            }
            token => Err(Error::InvalidToken(token.cloned())),
        }
    }

    fn group(&mut self, idx: usize, depth: usize) -> Result<(Expr, usize), Error> {
        let (left, idx) = self.expr(idx, depth)?;
        let operator = self.operator(idx)?;
        let (right, idx) = self.expr(idx + 1, depth)?;
        match self.tokens.get(idx) {
            Some(&Token::Symbol(')')) => {}
            _ => return Err(Error::MalformedExpression),
        }
        self.trace.group(&left, operator, &right);
        if operator == Operator::Assign && !matches!(left, Expr::Variable(_)) {
            return Err(Error::InvalidAssignmentTarget(left));
        }
        Ok((Expr::operation(operator, left, right), idx + 1))
    }

    fn operator(&self, idx: usize) -> Result<Operator, Error> {
        let token = self.tokens.get(idx).ok_or(Error::MalformedExpression)?;
        symbol(token)
            .and_then(Operator::from_symbol)
            .ok_or_else(|| Error::UnknownOperator(token.clone()))
    }
}

fn symbol(token: &Token) -> Option<char> {
    match *token {
        Token::Symbol(c) => Some(c),
        // Separator sets without `^` or `%` hand a spaced operator over as a word.
        Token::Word(ref word) if word.chars().count() == 1 => word.chars().next(),
        _ => None,
    }
}
