use std::iter::Fuse;
use std::sync::Arc;
use log::trace;
use grammar::{
  Grammar, SymbolId, RuleId, Token, LexicalError, AstNode, InternalNode,
};
use crate::{Error, ParseError};
use crate::cache::ActionTableCache;
use crate::table::{ActionTable, Action, StateId};

/// Shift-reduce engine driving an LALR(1) table over a token stream.
pub struct LrParser {
  grammar: Grammar,
  table: Arc<ActionTable>,
}

struct Frame {
  node: AstNode,
  state: StateId,
}

impl LrParser {
  /// Builds a parser accepting the target symbol of `grammar`. The table
  /// comes from `cache`, keyed by the grammar's fingerprint.
  pub fn new(mut grammar: Grammar, cache: &ActionTableCache) -> Result<Self, Error> {
    grammar.fix_precedence_levels();
    let table = cache.get_or_build(&grammar)?;
    Ok(LrParser { grammar, table })
  }

  /// Builds a parser accepting `target`, restricted to the rules reachable
  /// from it.
  pub fn for_target(
    grammar: &mut Grammar,
    target: SymbolId,
    cache: &ActionTableCache,
  ) -> Result<Self, Error> {
    let sub = grammar.sub_grammar(target)?.into_owned();
    Self::new(sub, cache)
  }

  /// `for_target` with the process-wide cache.
  pub fn for_symbol(grammar: &mut Grammar, target: SymbolId) -> Result<Self, Error> {
    Self::for_target(grammar, target, ActionTableCache::global())
  }

  pub fn grammar(&self) -> &Grammar {
    &self.grammar
  }

  pub fn table(&self) -> &ActionTable {
    &self.table
  }

  /// Parses a whole input. The stream ends with an end-of-input token, or
  /// simply runs out, in which case one is synthesized after the last
  /// token. Lexical errors are returned as they are.
  pub fn parse<I>(&self, tokens: I) -> Result<AstNode, Error>
    where I: IntoIterator<Item = Result<Token, LexicalError>>
  {
    let mut input = TokenStream::new(tokens.into_iter());
    let target = self.grammar.target_symbol().unwrap_or(SymbolId::EOF);
    let mut stack = vec![Frame {
      node: AstNode::Internal(InternalNode::new(RuleId::TARGET, target, vec![])),
      state: StateId::START,
    }];
    // states left through the ε column since the last shift
    let mut fallback_states = vec![];

    loop {
      let state = stack.last().map_or(StateId::START, |frame| frame.state);
      let token = input.next()?;

      trace!("state {} : token {} '{}'",
        state, self.grammar.symbol_name(token.symbol), token.text);

      let action = match self.table.action(state, token.symbol) {
        Some(action) => action,
        None => match self.table.action(state, SymbolId::EMPTY) {
          Some(action @ Action::Reduce(_)) if !fallback_states.contains(&state) => {
            trace!("  no action, falling back to ε");
            fallback_states.push(state);
            action
          }
          _ => return Err(self.parse_error(state, token).into()),
        }
      };

      trace!("  {}", action);

      match action {
        Action::Shift(next) => {
          fallback_states.clear();
          stack.push(Frame {
            node: AstNode::Leaf(token),
            state: next,
          });
        }
        Action::Reduce(rule) => {
          self.reduce(&mut stack, rule)?;
          input.push_back(token);
        }
        Action::Accept => {
          if stack.len() > 1 {
            if let Some(frame) = stack.pop() {
              return Ok(frame.node);
            }
          }
          return Err(self.parse_error(state, token).into());
        }
        Action::Fail => return Err(self.parse_error(state, token).into()),
      }
    }
  }

  fn reduce(&self, stack: &mut Vec<Frame>, rule_id: RuleId) -> Result<(), Error> {
    let rule = self.grammar.rule_by_id(rule_id)
      .ok_or(Error::MissingRule { rule: rule_id })?;

    // the bottom frame is never part of a handle
    let at = stack.len().saturating_sub(rule.arity()).max(1);
    let children = stack.drain(at..).map(|frame| frame.node).collect();

    let mut node = InternalNode::new(rule_id, rule.target(), children);
    if let Some(action) = rule.action() {
      action(&mut node);
    }

    let below = stack.last().map_or(StateId::START, |frame| frame.state);
    let state = self.table.goto(below, rule.target())
      .ok_or(Error::MissingGoto { state: below, symbol: rule.target() })?;

    trace!("  {} => goto {}", rule.display(self.grammar.symbols()), state);

    stack.push(Frame {
      node: AstNode::Internal(node),
      state,
    });
    Ok(())
  }

  fn parse_error(&self, state: StateId, token: Token) -> ParseError {
    let expected = self.table.expected(state).iter()
      .filter(|&&sym| sym != SymbolId::EMPTY)
      .map(|&sym| self.grammar.symbol_name(sym).to_owned())
      .collect();

    ParseError {
      token_type: self.grammar.symbol_name(token.symbol).to_owned(),
      token,
      expected,
    }
  }
}

/// Forward token stream with one token of pushback.
struct TokenStream<I: Iterator> {
  tokens: Fuse<I>,
  pushed_back: Option<Token>,
  /// position just past the last token read
  end: (u32, u32),
}

impl<I> TokenStream<I>
  where I: Iterator<Item = Result<Token, LexicalError>>
{
  fn new(tokens: I) -> Self {
    TokenStream {
      tokens: tokens.fuse(),
      pushed_back: None,
      end: (1, 1),
    }
  }

  fn next(&mut self) -> Result<Token, LexicalError> {
    if let Some(token) = self.pushed_back.take() {
      return Ok(token);
    }

    match self.tokens.next() {
      Some(Ok(token)) => {
        self.end = (token.line, token.column + token.text.chars().count() as u32);
        Ok(token)
      }
      Some(Err(err)) => Err(err),
      None => Ok(Token::eof(self.end.0, self.end.1)),
    }
  }

  fn push_back(&mut self, token: Token) {
    self.pushed_back = Some(token);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::table::ActionTable;
  use grammar::Associativity;
  use pretty_assertions::assert_eq;

  fn tokens(g: &Grammar, input: &str) -> Vec<Result<Token, LexicalError>> {
    input.chars().enumerate().map(|(i, c)| -> Result<Token, LexicalError> {
      let name = if c.is_ascii_digit() { "num".to_owned() } else { c.to_string() };
      let sym = g.symbols().lookup(grammar::SymbolKind::Terminal, &name)
        .ok_or_else(|| LexicalError {
          message: format!("unexpected `{}`", c),
          line: 1,
          column: i as u32 + 1,
        })?;
      Ok(Token::new(sym, c.to_string(), 1, i as u32 + 1))
    }).collect()
  }

  fn arith() -> Grammar {
    let mut g = Grammar::new();
    let e = g.nonterminal("E");
    let plus = g.terminal("+");
    let mult = g.terminal("*");
    let num = g.terminal("num");
    g.set_precedence_level(1, &[plus]);
    g.set_precedence_level(2, &[mult]);
    g.target(e).def(&[e, plus, e]).unwrap().with_associativity(Associativity::Left);
    g.target(e).def(&[e, mult, e]).unwrap().with_associativity(Associativity::Left);
    g.target(e).def(&[num]).unwrap();
    g
  }

  #[test]
  fn precedence_groups_product_first() {
    let g = arith();
    let parser = LrParser::new(g, &ActionTableCache::disabled()).unwrap();
    let ast = parser.parse(tokens(parser.grammar(), "1+2*3")).unwrap();
    assert_eq!(
      ast.display(parser.grammar().symbols()).to_string(),
      "(E (E 1) + (E (E 2) * (E 3)))");
  }

  #[test]
  fn left_associative() {
    let parser = LrParser::new(arith(), &ActionTableCache::disabled()).unwrap();
    let ast = parser.parse(tokens(parser.grammar(), "1+2+3")).unwrap();
    assert_eq!(
      ast.display(parser.grammar().symbols()).to_string(),
      "(E (E (E 1) + (E 2)) + (E 3))");
  }

  #[test]
  fn error_reports_expected_terminals() {
    let parser = LrParser::new(arith(), &ActionTableCache::disabled()).unwrap();
    let err = parser.parse(tokens(parser.grammar(), "1+*")).unwrap_err();
    assert_eq!(
      err.to_string(),
      "Parse error : (1:3) : expected num ( got * '*' instead)");
  }

  #[test]
  fn premature_end() {
    let parser = LrParser::new(arith(), &ActionTableCache::disabled()).unwrap();
    let err = parser.parse(tokens(parser.grammar(), "1+")).unwrap_err();
    assert_eq!(err.to_string(), "Parse error : (1:3) : expected num ( got $ instead)");
  }

  #[test]
  fn lexical_error_is_returned() {
    let parser = LrParser::new(arith(), &ActionTableCache::disabled()).unwrap();
    let err = parser.parse(tokens(parser.grammar(), "1?")).unwrap_err();
    assert!(matches!(err, Error::Lexical(LexicalError { column: 2, .. })));
  }

  #[test]
  fn non_associative_tie_fails() {
    let mut g = Grammar::new();
    let e = g.nonterminal("E");
    let eq = g.terminal("=");
    let num = g.terminal("num");
    g.set_precedence_level(1, &[eq]);
    g.target(e).def(&[e, eq, e]).unwrap().with_associativity(Associativity::NonAssoc);
    g.target(e).def(&[num]).unwrap();

    let parser = LrParser::new(g, &ActionTableCache::disabled()).unwrap();
    assert!(parser.parse(tokens(parser.grammar(), "1=2")).is_ok());
    let err = parser.parse(tokens(parser.grammar(), "1=2=3")).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError { ref token, .. }) if token.column == 4));
  }

  #[test]
  fn empty_rules() {
    // S → a Opt b ; Opt → ε | c
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let opt = g.nonterminal("Opt");
    let a = g.terminal("a");
    let b = g.terminal("b");
    let c = g.terminal("c");
    g.target(s).def(&[a, opt, b]).unwrap();
    g.add_empty_rule(opt).unwrap();
    g.target(opt).def(&[c]).unwrap();

    let parser = LrParser::new(g, &ActionTableCache::disabled()).unwrap();
    let symbols = parser.grammar().symbols();
    let ast = parser.parse(tokens(parser.grammar(), "ab")).unwrap();
    assert_eq!(ast.display(symbols).to_string(), "(S a (Opt) b)");
    let ast = parser.parse(tokens(parser.grammar(), "acb")).unwrap();
    assert_eq!(ast.display(symbols).to_string(), "(S a (Opt c) b)");
  }

  #[test]
  fn epsilon_fallback_does_not_loop() {
    // S → a Opt b ; Opt → ε
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let opt = g.nonterminal("Opt");
    let a = g.terminal("a");
    let b = g.terminal("b");
    g.terminal("x");
    g.target(s).def(&[a, opt, b]).unwrap();
    g.add_empty_rule(opt).unwrap();

    let parser = LrParser::new(g, &ActionTableCache::disabled()).unwrap();
    let err = parser.parse(tokens(parser.grammar(), "ax")).unwrap_err();
    assert_eq!(err.to_string(), "Parse error : (1:2) : expected b ( got x 'x' instead)");
  }

  #[test]
  fn foreign_table_is_detected() {
    let g = arith();
    let mut other = Grammar::new();
    let s = other.nonterminal("S");
    let x = other.terminal("x");
    other.target(s).def(&[s, x]).unwrap();
    other.target(s).def(&[x]).unwrap();

    let table: ActionTable = crate::build(&other).unwrap();
    let parser = LrParser {
      grammar: g,
      table: Arc::new(table),
    };
    assert!(parser.parse(tokens(parser.grammar(), "11")).is_err());
  }
}
