extern crate calc;
extern crate clap;
extern crate quickcheck;
extern crate rand;

use calc::Expr;
use clap::Parser;
use quickcheck::{Arbitrary, Gen};
use rand::Rng;

/// Print a random fully-parenthesized expression.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Generator size; picked at random from 1 to 10 when omitted.
    size: Option<usize>,
}

fn main() {
    let args = Args::parse();
    let size = args
        .size
        .unwrap_or_else(|| rand::thread_rng().gen_range(1..=10));
    eprintln!("Generating an expression of size {}", size);

    let mut gen = Gen::new(size);
    println!("{}", Expr::arbitrary(&mut gen).source());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn size_is_optional() {
        Args::command().debug_assert();
        assert_eq!(Args::try_parse_from(&["calcg"]).unwrap().size, None);
        assert_eq!(Args::try_parse_from(&["calcg", "4"]).unwrap().size, Some(4));
        assert!(Args::try_parse_from(&["calcg", "four"]).is_err());
    }
}
