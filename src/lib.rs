extern crate log;
extern crate nom;
extern crate quickcheck;
extern crate thiserror;

pub mod tokenizer;
pub mod parser;
pub mod interpreter;
pub mod session;

pub use interpreter::Environment;

use quickcheck::{Arbitrary, Gen};
use std::fmt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] parser::Error),
    #[error(transparent)]
    Interpreter(#[from] interpreter::Error),
}

/// Tokenizes, parses and evaluates one line against `env`.
pub fn interpret(s: &str, env: &mut Environment) -> Result<f64, Error> {
    let tokens = tokenizer::tokenize(s);
    let expr = parser::parse(&tokens)?;
    let value = interpreter::evaluate(&expr, env)?;
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(pub String);

impl Name {
    pub fn new(s: &str) -> Name {
        Name(s.to_string())
    }

    /// Identifiers are made of ASCII letters only.
    pub fn is_valid(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Arbitrary for Name {
    fn arbitrary(g: &mut Gen) -> Name {
        arbitrary_name(g, 0)
    }
}

fn arbitrary_name(g: &mut Gen, level: usize) -> Name {
    let size = g.size().saturating_sub(level).max(1);
    let len = 1 + gen_below(g, size);
    let letters = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    Name((0..len)
        .map(|_| letters[gen_below(g, letters.len())] as char)
        .collect())
}

fn gen_below(g: &mut Gen, n: usize) -> usize {
    usize::arbitrary(g) % n
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Word(String),
    Symbol(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Word(ref w) => write!(f, "{}", w),
            Token::Symbol(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    Assign,
}

impl Operator {
    pub fn from_symbol(c: char) -> Option<Operator> {
        Some(match c {
            '+' => Operator::Add,
            '-' => Operator::Sub,
            '*' => Operator::Mul,
            '/' => Operator::Div,
            '^' => Operator::Pow,
            '%' => Operator::Mod,
            '=' => Operator::Assign,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Pow => '^',
            Operator::Mod => '%',
            Operator::Assign => '=',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "Add",
            Operator::Sub => "Sub",
            Operator::Mul => "Mul",
            Operator::Div => "Div",
            Operator::Pow => "Pow",
            Operator::Mod => "Mod",
            Operator::Assign => "Assign",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Arbitrary for Operator {
    fn arbitrary(g: &mut Gen) -> Operator {
        match gen_below(g, 7) {
            0 => Operator::Add,
            1 => Operator::Sub,
            2 => Operator::Mul,
            3 => Operator::Div,
            4 => Operator::Pow,
            5 => Operator::Mod,
            6 => Operator::Assign,
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Variable(Name),
    Operation(Operator, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn operation(operator: Operator, left: Expr, right: Expr) -> Expr {
        Expr::Operation(operator, Box::new(left), Box::new(right))
    }

    /// Renders the expression as parseable input, e.g. `(a = (1 + 2))`.
    pub fn source(&self) -> Source<'_> {
        Source(self)
    }

    pub fn tokens(&self) -> Vec<Token> {
        match *self {
            Expr::Literal(value) => vec![Token::Number(value)],
            Expr::Variable(ref name) => vec![Token::Word(name.0.clone())],
            Expr::Operation(operator, ref left, ref right) => {
                let mut tokens = vec![Token::Symbol('(')];
                tokens.extend(left.tokens());
                tokens.push(Token::Symbol(operator.symbol()));
                tokens.extend(right.tokens());
                tokens.push(Token::Symbol(')'));
                tokens
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Expr::Literal(value) => write!(f, "Num({})", value),
            Expr::Variable(ref name) => write!(f, "Var('{}')", name),
            Expr::Operation(operator, ref left, ref right) => {
                write!(f, "{}({}, {})", operator.name(), left, right)
            }
        }
    }
}

pub struct Source<'a>(&'a Expr);

impl<'a> fmt::Display for Source<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Variable(ref name) => write!(f, "{}", name),
            Expr::Operation(operator, ref left, ref right) => {
                write!(f, "({} {} {})", left.source(), operator, right.source())
            }
        }
    }
}

impl Arbitrary for Expr {
    fn arbitrary(g: &mut Gen) -> Expr {
        arbitrary_expr(g, 0)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Expr>> {
        match *self {
            Expr::Operation(Operator::Assign, _, ref right) => {
                Box::new(vec![*right.clone()].into_iter())
            }
            Expr::Operation(_, ref left, ref right) => {
                Box::new(vec![*left.clone(), *right.clone()].into_iter())
            }
            _ => quickcheck::empty_shrinker(),
        }
    }
}

fn arbitrary_expr(g: &mut Gen, level: usize) -> Expr {
    let size = g.size().saturating_sub(level);
    // Terminate expressions of sufficient depth.
    if size <= 1 {
        return arbitrary_leaf(g, level + 1);
    }
    match gen_below(g, 2) {
        0 => arbitrary_leaf(g, level + 1),
        1 => {
            let operator = Operator::arbitrary(g);
            let left = match operator {
                Operator::Assign => Expr::Variable(arbitrary_name(g, level + 1)),
                _ => arbitrary_expr(g, level + 1),
            };
            let right = arbitrary_expr(g, level + 1);
            Expr::operation(operator, left, right)
        }
        _ => unreachable!(),
    }
}

fn arbitrary_leaf(g: &mut Gen, level: usize) -> Expr {
    match gen_below(g, 2) {
        0 => Expr::Literal(arbitrary_literal(g)),
        1 => Expr::Variable(arbitrary_name(g, level)),
        _ => unreachable!(),
    }
}

// Negative literals have no source form: `-` always splits a word.
fn arbitrary_literal(g: &mut Gen) -> f64 {
    let divisor = *g.choose(&[1u16, 2, 4, 10, 1000]).unwrap_or(&1);
    f64::from(u16::arbitrary(g)) / f64::from(divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form() {
        let expr = Expr::operation(
            Operator::Assign,
            Expr::Variable(Name::new("ans")),
            Expr::operation(
                Operator::Add,
                Expr::Literal(24.0),
                Expr::Variable(Name::new("abc")),
            ),
        );
        assert_eq!(
            format!("{}", expr),
            "Assign(Var('ans'), Add(Num(24), Var('abc')))"
        );
        assert_eq!(format!("{}", expr.source()), "(ans = (24 + abc))");
    }

    #[test]
    fn fractional_literals_keep_their_digits() {
        assert_eq!(format!("{}", Expr::Literal(0.5)), "Num(0.5)");
        assert_eq!(format!("{}", Expr::Literal(0.5).source()), "0.5");
    }

    #[test]
    fn operator_symbols_are_bijective() {
        for c in "+-*/^%=".chars() {
            assert_eq!(Operator::from_symbol(c).map(Operator::symbol), Some(c));
        }
        assert_eq!(Operator::from_symbol('('), None);
    }

    #[test]
    fn name_validity() {
        assert!(Name::is_valid("abc"));
        assert!(Name::is_valid("ABc"));
        assert!(!Name::is_valid(""));
        assert!(!Name::is_valid("a1"));
        assert!(!Name::is_valid("a_b"));
    }

    #[test]
    fn interpret_threads_the_environment() {
        let mut env = Environment::new();
        assert_eq!(interpret("(abc = 42)", &mut env), Ok(42.0));
        assert_eq!(
            interpret("(ans = (24 + (abc * ((16 / 2) - 5))))", &mut env),
            Ok(150.0)
        );
        assert_eq!(interpret("abc", &mut env), Ok(42.0));
        assert_eq!(env.get(&Name::new("ans")), Some(150.0));
    }

    #[test]
    fn interpret_reports_parse_errors() {
        let mut env = Environment::new();
        assert_eq!(
            interpret("(5 + 3", &mut env),
            Err(Error::Parse(parser::Error::MalformedExpression))
        );
    }

    #[test]
    fn deeply_nested_line_keeps_the_environment() {
        let mut env = Environment::new();
        interpret("(x = 7)", &mut env).unwrap();
        let line = |depth: usize| format!("(x = {}1{})", "(1 + ".repeat(depth), ")".repeat(depth));
        assert_eq!(
            interpret(&line(100_000), &mut env),
            Err(Error::Parse(parser::Error::TooDeep(parser::MAX_DEPTH)))
        );
        assert_eq!(env.get(&Name::new("x")), Some(7.0));
        let limit = parser::MAX_DEPTH - 1;
        assert_eq!(interpret(&line(limit), &mut env), Ok(limit as f64 + 1.0));
        assert_eq!(env.get(&Name::new("x")), Some(limit as f64 + 1.0));
    }
}
