use super::*;
use nom::branch::alt;
use nom::bytes::complete::{take_till1, take_while1};
use nom::character::complete::satisfy;
use nom::combinator::{all_consuming, map};
use nom::multi::fold_many0;
use nom::number::complete::recognize_float;
use nom::IResult;

/// Characters that end a word and are emitted as tokens of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators(Vec<char>);

impl Separators {
    pub fn new(chars: &str) -> Separators {
        Separators(chars.chars().collect())
    }

    /// The historic set, which lacks `^` and `%` and so glues them onto
    /// neighbouring words.
    pub fn legacy() -> Separators {
        Separators::new("()+-*/=")
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }
}

impl Default for Separators {
    fn default() -> Separators {
        Separators::new("()+-*/=^%")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    separators: Separators,
}

impl Tokenizer {
    pub fn new(separators: Separators) -> Tokenizer {
        Tokenizer { separators }
    }

    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = fold_many0(
            piece(&self.separators),
            Vec::new,
            |mut tokens: Vec<Token>, piece| {
                if let Some(token) = piece {
                    tokens.push(token);
                }
                tokens
            },
        );
        // Every character belongs to some piece, so the fold always reaches
        // the end of the input.
        let result: IResult<&str, Vec<Token>> = tokens(input);
        result.map(|(_, tokens)| tokens).unwrap_or_default()
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::default().tokenize(input)
}

// A run of whitespace yields nothing; a separator or a word yields a token.
fn piece<'a>(
    separators: &'a Separators,
) -> impl FnMut(&'a str) -> IResult<&'a str, Option<Token>> + 'a {
    alt((
        map(take_while1(char::is_whitespace), |_| None),
        map(satisfy(move |c| separators.contains(c)), |c| {
            Some(Token::Symbol(c))
        }),
        map(
            take_till1(move |c: char| c.is_whitespace() || separators.contains(c)),
            |w| Some(word(w)),
        ),
    ))
}

fn word(w: &str) -> Token {
    match number(w) {
        Some(n) => Token::Number(n),
        None => Token::Word(w.to_string()),
    }
}

// Only words that start like a number are numbers; `inf` and `NaN` stay words.
fn number(w: &str) -> Option<f64> {
    if !w.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let literal: IResult<&str, &str> = all_consuming(recognize_float)(w);
    literal.ok().and_then(|_| w.parse().ok())
}
