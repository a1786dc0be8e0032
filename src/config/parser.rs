//! Parser for the block/key-value configuration grammar
//!
//! ```text
//! general { interval = 5 colors = true }
//! order += "disk /"
//! disk "/" { format = "%avail" }
//! ```
//!
//! Newlines are plain whitespace and `#` starts a comment, so a whole
//! configuration may sit on a single line.

use super::{warn_unused_blocks, Configuration, General, ModuleKey, OptionValue, Options};
use crate::error::{Result, StatusError};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Word(String),
    Str(String),
    LBrace,
    RBrace,
    Eq,
    PlusEq,
}

impl Tok {
    fn text(&self) -> String {
        match self {
            Tok::Word(w) => w.clone(),
            Tok::Str(s) => format!("\"{}\"", s),
            Tok::LBrace => "{".to_string(),
            Tok::RBrace => "}".to_string(),
            Tok::Eq => "=".to_string(),
            Tok::PlusEq => "+=".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '{' => {
                chars.next();
                tokens.push(Token { tok: Tok::LBrace, line });
            }
            '}' => {
                chars.next();
                tokens.push(Token { tok: Tok::RBrace, line });
            }
            '=' => {
                chars.next();
                tokens.push(Token { tok: Tok::Eq, line });
            }
            '"' => {
                let start = line;
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('\n') => {
                                line += 1;
                                value.push('\n');
                            }
                            Some(escaped) => value.push(escaped),
                            None => break,
                        },
                        '\n' => {
                            line += 1;
                            value.push('\n');
                        }
                        other => value.push(other),
                    }
                }
                if !closed {
                    let preview: String = value.chars().take(16).collect();
                    return Err(StatusError::parse(
                        start,
                        format!("\"{}", preview),
                        "unterminated string",
                    ));
                }
                tokens.push(Token { tok: Tok::Str(value), line: start });
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '{' | '}' | '=' | '"') {
                        break;
                    }
                    if c == '+' {
                        let mut ahead = chars.clone();
                        ahead.next();
                        if ahead.peek() == Some(&'=') {
                            break;
                        }
                    }
                    word.push(c);
                    chars.next();
                }
                if word.is_empty() {
                    // a lone '+' followed by '='
                    chars.next();
                    chars.next();
                    tokens.push(Token { tok: Tok::PlusEq, line });
                } else {
                    tokens.push(Token { tok: Tok::Word(word), line });
                }
            }
        }
    }

    Ok(tokens)
}

/// Whether `text` reads back as a single bare word token
pub(crate) fn is_word(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with('#')
        && !text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '=' | '"'))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |t| t.line)
    }

    fn expect(&mut self, want: Tok, context: &str) -> Result<Token> {
        match self.next() {
            Some(token) if token.tok == want => Ok(token),
            Some(token) => Err(StatusError::parse(
                token.line,
                token.tok.text(),
                format!("expected '{}' {}", want.text(), context),
            )),
            None => Err(StatusError::parse(
                self.last_line(),
                "<eof>",
                format!("expected '{}' {}", want.text(), context),
            )),
        }
    }

    /// Read `key = value` pairs up to the closing brace of a block opened on `open_line`
    fn pairs(&mut self, open_line: usize) -> Result<Vec<(String, OptionValue, usize)>> {
        let mut pairs: Vec<(String, OptionValue, usize)> = Vec::new();
        loop {
            let token = self.next().ok_or_else(|| {
                StatusError::parse(open_line, "{", "block is never closed")
            })?;
            let key = match token.tok {
                Tok::RBrace => return Ok(pairs),
                Tok::Word(key) => key,
                other => {
                    return Err(StatusError::parse(
                        token.line,
                        other.text(),
                        "expected an option name or '}'",
                    ))
                }
            };
            self.expect(Tok::Eq, &format!("after option '{}'", key))?;
            let value_token = self.next().ok_or_else(|| {
                StatusError::parse(open_line, "{", "block is never closed")
            })?;
            let value = match value_token.tok {
                Tok::Str(s) => OptionValue::Str(s),
                Tok::Word(w) => OptionValue::from_word(&w),
                other => {
                    return Err(StatusError::parse(
                        value_token.line,
                        other.text(),
                        format!("expected a value for option '{}'", key),
                    ))
                }
            };
            if pairs.iter().any(|(k, _, _)| *k == key) {
                return Err(StatusError::parse(token.line, key, "option set twice in block"));
            }
            pairs.push((key, value, token.line));
        }
    }
}

/// Parse configuration text into a [`Configuration`]
pub fn parse_config(text: &str) -> Result<Configuration> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        pos: 0,
    };
    let mut config = Configuration::default();
    let mut seen_general = false;
    let mut ordered: HashSet<ModuleKey> = HashSet::new();

    while let Some(token) = parser.next() {
        let word = match token.tok {
            Tok::Word(word) => word,
            Tok::RBrace => {
                return Err(StatusError::parse(token.line, "}", "unmatched closing brace"))
            }
            other => {
                return Err(StatusError::parse(
                    token.line,
                    other.text(),
                    "expected a block or an order entry",
                ))
            }
        };

        match word.as_str() {
            "general" => {
                if seen_general {
                    return Err(StatusError::parse(token.line, word, "general block given twice"));
                }
                seen_general = true;
                let open = parser.expect(Tok::LBrace, "after 'general'")?;
                let mut general = General::default();
                for (key, value, line) in parser.pairs(open.line)? {
                    general
                        .set(&key, &value)
                        .map_err(|msg| StatusError::parse(line, key.clone(), msg))?;
                }
                config.general = general;
            }
            "order" => {
                parser.expect(Tok::PlusEq, "after 'order'")?;
                let entry = parser.next();
                let (entry, line) = match entry {
                    Some(Token { tok: Tok::Str(s), line }) => (s, line),
                    Some(other) => {
                        return Err(StatusError::parse(
                            other.line,
                            other.tok.text(),
                            "order entries must be quoted strings",
                        ))
                    }
                    None => {
                        return Err(StatusError::parse(
                            token.line,
                            "<eof>",
                            "order entry is missing",
                        ))
                    }
                };
                let key = ModuleKey::parse(&entry)
                    .ok_or_else(|| StatusError::parse(line, "\"\"", "empty order entry"))?;
                if !ordered.insert(key.clone()) {
                    return Err(StatusError::parse(
                        line,
                        format!("\"{}\"", entry),
                        "module listed twice in order",
                    ));
                }
                config.order.push(key);
            }
            kind => {
                let instance = match parser.peek().map(|t| &t.tok) {
                    Some(Tok::Word(w)) => Some(w.clone()),
                    Some(Tok::Str(s)) => Some(s.clone()),
                    _ => None,
                };
                if instance.is_some() {
                    parser.pos += 1;
                }
                let open = parser.expect(Tok::LBrace, &format!("to open the '{}' block", kind))?;
                let key = ModuleKey::new(kind, instance.as_deref());
                if config.modules.contains_key(&key) {
                    return Err(StatusError::parse(
                        token.line,
                        key.to_string(),
                        "duplicate module block",
                    ));
                }
                let options: Options = parser
                    .pairs(open.line)?
                    .into_iter()
                    .map(|(k, v, _)| (k, v))
                    .collect();
                config.modules.insert(key, options);
            }
        }
    }

    warn_unused_blocks(&config);
    Ok(config)
}
