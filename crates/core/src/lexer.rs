//! Tokenizer for the expression bodies of computed (`python macro`) macros.
//!
//! Definition lines are single-line, so tokens carry a 1-based column
//! rather than a line number.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Parameter names and builtin function names
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Integer literal
    Int(i64),
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub column: usize,
}

/// A lexing or parsing failure inside an expression body.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(column: usize, message: impl Into<String>) -> Self {
        SyntaxError {
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}: {}", self.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}

pub fn lex(src: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];
        let column = pos + 1;

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // String literal, either quote style
        if c == '\'' || c == '"' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(SyntaxError::new(column, "unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(SyntaxError::new(column, "unterminated escape in string"));
                    }
                    match chars[pos] {
                        '\'' => s.push('\''),
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                column,
            });
            continue;
        }

        // Integer; a leading '-' is always an operator token
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let s: String = chars[start..pos].iter().collect();
            let n: i64 = s
                .parse()
                .map_err(|_| SyntaxError::new(column, format!("invalid integer '{}'", s)))?;
            tokens.push(Spanned {
                token: Token::Int(n),
                column,
            });
            continue;
        }

        let punct = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ',' => Some(Token::Comma),
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            _ => None,
        };
        if let Some(token) = punct {
            // Floor division may be spelled `//`; both spellings mean the same thing.
            if token == Token::Slash && chars.get(pos + 1) == Some(&'/') {
                pos += 1;
            }
            tokens.push(Spanned { token, column });
            pos += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                column,
            });
            continue;
        }

        return Err(SyntaxError::new(
            column,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        column: chars.len() + 1,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_lex_call_with_index() {
        assert_eq!(
            kinds("ord(s[1])"),
            vec![
                Token::Word("ord".into()),
                Token::LParen,
                Token::Word("s".into()),
                Token::LBracket,
                Token::Int(1),
                Token::RBracket,
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_both_quote_styles() {
        assert_eq!(
            kinds(r#"'a\'b' + "c""#),
            vec![
                Token::Str("a'b".into()),
                Token::Plus,
                Token::Str("c".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_double_slash_is_division() {
        assert_eq!(
            kinds("a // 2"),
            vec![
                Token::Word("a".into()),
                Token::Slash,
                Token::Int(2),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_lex_rejects_unknown_character() {
        let err = lex("a ; b").unwrap_err();
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_lex_unterminated_string() {
        let err = lex("'abc").unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
    }
}
