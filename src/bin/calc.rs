extern crate calc;
extern crate clap;
extern crate env_logger;
extern crate rustyline;

use calc::session::{Config, Reply, Session, DEFAULT_HISTORY_SIZE};
use calc::tokenizer::Separators;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::error::Error;
use std::process;

/// Evaluates fully-parenthesized arithmetic such as `(ans = (24 + (abc * 3)))`.
///
/// At the prompt, `env` lists variables, `history` lists recent lines and
/// `quit` or `exit` leaves.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Evaluate EXPR and print the result instead of starting the prompt.
    /// Repeat to evaluate several expressions against one environment.
    #[arg(short, long, value_name = "EXPR")]
    eval: Vec<String>,

    /// Number of lines kept for the `history` command.
    #[arg(long, default_value_t = DEFAULT_HISTORY_SIZE)]
    history_size: usize,

    /// Only split words on `( ) + - * / =`, so `^` and `%` need spaces.
    #[arg(long)]
    legacy_separators: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        separators: if args.legacy_separators {
            Separators::legacy()
        } else {
            Separators::default()
        },
        history_size: args.history_size,
    };
    let mut session = Session::new(config);

    let result = if args.eval.is_empty() {
        prompt(&mut session, args.history_size)
    } else {
        run_all(&mut session, &args.eval)
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run_all(session: &mut Session, lines: &[String]) -> Result<(), Box<dyn Error>> {
    for line in lines {
        let reply = session.handle(line)?;
        show(&reply);
        if reply == Reply::Quit {
            break;
        }
    }
    Ok(())
}

fn prompt(session: &mut Session, history_size: usize) -> Result<(), Box<dyn Error>> {
    let editor_config = rustyline::Config::builder()
        .max_history_size(history_size)
        .history_ignore_dups(true)
        .build();
    let mut rl = Editor::<()>::with_config(editor_config)?;

    loop {
        let line = match rl.readline("% ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                show(&Reply::Quit);
                break;
            }
            Err(err) => return Err(err.into()),
        };
        match session.handle(&line) {
            Ok(reply) => {
                if let Reply::Value(_) = reply {
                    rl.add_history_entry(line.trim());
                }
                show(&reply);
                if reply == Reply::Quit {
                    break;
                }
            }
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}

fn show(reply: &Reply) {
    match *reply {
        Reply::Nothing => {}
        Reply::Value(value) => println!("{}", value),
        Reply::Environment(ref dump) => println!("ENV = {}", dump),
        Reply::History(ref lines) => {
            println!("HISTORY:");
            for line in lines {
                println!("\t{}", line);
            }
            println!("END");
        }
        Reply::Quit => println!("bye!"),
    }
}
