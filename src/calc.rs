//! Arithmetic expressions: the grammar driven by the command line tool and
//! a lexer producing its tokens.

use std::iter::Peekable;
use std::str::CharIndices;
use grammar::{Grammar, GrammarError, SymbolId, SymbolKind, Associativity, Token, LexicalError};

/// ```text
/// E → E + E | E - E | E * E | E / E | E % E | E ^ E
///   | - E | ( E ) | id ( args ) | num | id
/// ```
///
/// `+ -` < `* / %` < unary `-` < `^`, the power operator associating to the
/// right.
pub fn grammar() -> Result<Grammar, GrammarError> {
  let mut g = Grammar::named("arithmetic");
  let e = g.nonterminal("E");
  let plus = g.terminal("+");
  let minus = g.terminal("-");
  let mult = g.terminal("*");
  let div = g.terminal("/");
  let rem = g.terminal("%");
  let pow = g.terminal("^");
  let lparen = g.terminal("(");
  let rparen = g.terminal(")");
  let comma = g.terminal(",");
  let num = g.terminal("num");
  let id = g.terminal("id");

  g.set_precedence_level(1, &[plus, minus]);
  g.set_precedence_level(2, &[mult, div, rem]);
  g.set_precedence_level(4, &[pow]);

  for op in [plus, minus, mult, div, rem] {
    g.target(e).def(&[e, op, e])?
      .with_associativity(Associativity::Left);
  }
  g.target(e).def(&[e, pow, e])?
    .with_associativity(Associativity::Right);
  g.target(e).def(&[minus, e])?
    .with_name("negation")
    .with_precedence_level(3);
  g.target(e).def(&[lparen, e, rparen])?
    .with_action(|node| node.children.retain(|child| !child.is_leaf()));

  let args = g.list(true, comma, e)?;
  g.target(e).def(&[id, lparen, args, rparen])?
    .with_name("call");
  g.target(e).def(&[num])?;
  g.target(e).def(&[id])?;

  Ok(g)
}

/// Numbers are digits with an optional fraction, identifiers are letters,
/// digits and `_` not starting with a digit. Any other character must be a
/// terminal of `grammar`.
pub struct Lexer<'a> {
  grammar: &'a Grammar,
  input: &'a str,
  chars: Peekable<CharIndices<'a>>,
  line: u32,
  /// byte offset of the current line
  bol: usize,
  num: Option<SymbolId>,
  id: Option<SymbolId>,
}

impl<'a> Lexer<'a> {
  pub fn new(grammar: &'a Grammar, input: &'a str) -> Self {
    let symbols = grammar.symbols();
    Self {
      grammar,
      input,
      chars: input.char_indices().peekable(),
      line: 1,
      bol: 0,
      num: symbols.lookup(SymbolKind::Terminal, "num"),
      id: symbols.lookup(SymbolKind::Terminal, "id"),
    }
  }

  fn column(&self, index: usize) -> u32 {
    self.input[self.bol..index].chars().count() as u32 + 1
  }

  fn take_while(&mut self, start: usize, mut pred: impl FnMut(char) -> bool) -> &'a str {
    let mut end = start;
    while let Some(&(i, c)) = self.chars.peek() {
      if !pred(c) {
        break;
      }
      end = i + c.len_utf8();
      self.chars.next();
    }
    &self.input[start..end]
  }

  fn token(&self, symbol: Option<SymbolId>, text: &str, index: usize) -> Result<Token, LexicalError> {
    let column = self.column(index);
    match symbol {
      Some(symbol) => Ok(Token::new(symbol, text, self.line, column)),
      None => Err(LexicalError {
        message: format!("unexpected `{}`", text),
        line: self.line,
        column,
      }),
    }
  }
}

impl<'a> Iterator for Lexer<'a> {
  type Item = Result<Token, LexicalError>;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(&(i, c)) = self.chars.peek() {
      if c == '\n' {
        self.line += 1;
        self.bol = i + 1;
      } else if !c.is_whitespace() {
        break;
      }
      self.chars.next();
    }

    let &(i, c) = self.chars.peek()?;

    if c.is_ascii_digit() {
      let mut seen_dot = false;
      let text = self.take_while(i, |c| {
        if c == '.' && !seen_dot {
          seen_dot = true;
          true
        } else {
          c.is_ascii_digit()
        }
      });
      return Some(self.token(self.num, text, i));
    }

    if c.is_alphabetic() || c == '_' {
      let text = self.take_while(i, |c| c.is_alphanumeric() || c == '_');
      return Some(self.token(self.id, text, i));
    }

    self.chars.next();
    let text = &self.input[i..i + c.len_utf8()];
    let symbol = self.grammar.symbols().lookup(SymbolKind::Terminal, text)
      .filter(|&sym| sym != SymbolId::EOF && sym != SymbolId::EMPTY);
    Some(self.token(symbol, text, i))
  }
}
