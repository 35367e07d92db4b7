use parsergens::calc;
use parsergens::grammar::AstNode;
use parsergens::lr::{ActionTableCache, Error, LrParser};

pub fn parser(cache: &ActionTableCache) -> LrParser {
  LrParser::new(calc::grammar().unwrap(), cache).unwrap()
}

pub fn parse(parser: &LrParser, input: &str) -> Result<AstNode, Error> {
  parser.parse(calc::Lexer::new(parser.grammar(), input))
}

/// The tree as an s-expression, or the error message.
pub fn sexp(parser: &LrParser, input: &str) -> String {
  match parse(parser, input) {
    Ok(ast) => ast.display(parser.grammar().symbols()).to_string(),
    Err(err) => err.to_string(),
  }
}

/// Evaluates a tree of the arithmetic grammar. `max` and `min` are the only
/// functions, there are no variables.
pub fn eval(node: &AstNode) -> f64 {
  let children = node.children();
  let text = |node: &AstNode| node.as_token().map(|token| token.text.clone()).unwrap_or_default();

  match children {
    [leaf] if leaf.is_leaf() => text(leaf).parse().unwrap(),
    [inner] => eval(inner),
    [op, operand] => {
      assert_eq!(text(op), "-");
      -eval(operand)
    }
    [lhs, op, rhs] => {
      let (lhs, rhs) = (eval(lhs), eval(rhs));
      match text(op).as_str() {
        "+" => lhs + rhs,
        "-" => lhs - rhs,
        "*" => lhs * rhs,
        "/" => lhs / rhs,
        "%" => lhs % rhs,
        "^" => lhs.powf(rhs),
        op => panic!("unknown operator {}", op),
      }
    }
    [func, _, args, _] => {
      let args = args.children().iter().map(eval);
      match text(func).as_str() {
        "max" => args.fold(f64::NEG_INFINITY, f64::max),
        "min" => args.fold(f64::INFINITY, f64::min),
        func => panic!("unknown function {}", func),
      }
    }
    _ => panic!("unexpected node {:?}", node),
  }
}
