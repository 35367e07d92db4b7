use lr::grammar::{Grammar, Token, LexicalError, SymbolKind, AstNode};

/// Tokens of `input`: runs of digits are `num` tokens, identifiers made of
/// letters are `id` tokens unless a terminal has that exact name, any other
/// character is the terminal of the same name. Whitespace is skipped.
pub fn tokens(grammar: &Grammar, input: &str) -> Vec<Result<Token, LexicalError>> {
  let mut tokens = vec![];
  let mut chars = input.chars().peekable();
  let (mut line, mut column) = (1, 1);

  while let Some(&c) = chars.peek() {
    if c == '\n' {
      chars.next();
      line += 1;
      column = 1;
      continue;
    }
    if c.is_whitespace() {
      chars.next();
      column += 1;
      continue;
    }

    let mut text = String::new();
    if c.is_ascii_alphanumeric() {
      let digits = c.is_ascii_digit();
      while let Some(&c) = chars.peek() {
        if (digits && c.is_ascii_digit()) || (!digits && c.is_ascii_alphabetic()) {
          text.push(c);
          chars.next();
        } else {
          break;
        }
      }
    } else {
      text.push(c);
      chars.next();
    }

    let name = if text.chars().all(|c| c.is_ascii_digit()) {
      "num"
    } else if grammar.symbols().lookup(SymbolKind::Terminal, &text).is_some() {
      text.as_str()
    } else if text.chars().all(|c| c.is_ascii_alphabetic()) {
      "id"
    } else {
      text.as_str()
    };

    let token = match grammar.symbols().lookup(SymbolKind::Terminal, name) {
      Some(sym) => Ok(Token::new(sym, text.clone(), line, column)),
      None => Err(LexicalError {
        message: format!("unexpected `{}`", text),
        line,
        column,
      }),
    };
    tokens.push(token);
    column += text.chars().count() as u32;
  }

  tokens
}

/// Texts of the leaves, in order.
pub fn leaves(node: &AstNode) -> Vec<String> {
  node.leaves().into_iter().map(|token| token.text.clone()).collect()
}
