use std::env;
use std::process;
use getopts::Options;
use log::LevelFilter;
use parsergens::calc;
use parsergens::lr::{self, ActionTableCache, CacheConfig, LrParser};

fn main() {
  let args = env::args().collect::<Vec<_>>();
  let prog = args[0].clone();
  let mut opts = Options::new();
  opts.optflag("t", "trace", "Log every parser step to stderr");
  opts.optflag("", "no-cache", "Always build the action table");
  opts.optopt("c", "cache-dir",
    "Directory of persisted action tables. Defaults to the user cache\n\
      directory, or to $PARSERGENS_CACHE_DIR when set",
    "DIR");
  opts.optflag("", "conflicts", "Print the conflicts resolved while building the table");
  opts.optflag("", "states", "Print the item sets of the automaton");
  opts.optflag("h", "help", "Print this message");

  let matches = match opts.parse(&args[1..]) {
    Ok(m) => m,
    Err(err) => {
      eprintln!("{}", err);
      process::exit(1);
    }
  };

  if matches.opt_present("h") {
    print_usage(prog, opts);
    return;
  }

  let mut logger = env_logger::Builder::from_default_env();
  if matches.opt_present("t") {
    logger.filter_level(LevelFilter::Trace);
  }
  logger.init();

  let reports = matches.opt_present("conflicts") || matches.opt_present("states");
  let input = match matches.free.as_slice() {
    [input] => Some(input.clone()),
    [] if reports => None,
    _ => {
      print_usage(prog, opts);
      process::exit(1);
    }
  };

  let mut config = CacheConfig::from_env();
  if matches.opt_present("no-cache") {
    config.enabled = false;
  }
  if let Some(dir) = matches.opt_str("c") {
    config = config.with_directory(dir);
  }
  let cache = ActionTableCache::new(config);

  let parser = match calc::grammar()
    .map_err(lr::Error::from)
    .and_then(|grammar| LrParser::new(grammar, &cache))
  {
    Ok(parser) => parser,
    Err(err) => {
      eprintln!("{}", err);
      process::exit(1);
    }
  };

  if matches.opt_present("states") {
    match lr::report::report_states(parser.grammar()) {
      Ok(report) => print!("{}", report),
      Err(err) => {
        eprintln!("{}", err);
        process::exit(1);
      }
    }
  }

  if matches.opt_present("conflicts") {
    print!("{}", lr::report::report_conflicts(parser.grammar(), parser.table()));
  }

  if let Some(input) = input {
    match parser.parse(calc::Lexer::new(parser.grammar(), &input)) {
      Ok(ast) => println!("{}", ast.display(parser.grammar().symbols())),
      Err(err) => {
        eprintln!("{}", err);
        process::exit(2);
      }
    }
  }
}

fn print_usage(prog: String, opts: Options) {
  let brief = format!("Usage: {} [options] EXPR", prog);
  print!("{}", opts.usage(&brief));
}
