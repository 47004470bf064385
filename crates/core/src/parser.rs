//! Recursive-descent parser for computed macro expressions.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := '-' unary | postfix
//! postfix := atom ('[' expr ']')*
//! atom    := INT | STR | NAME | BUILTIN '(' args ')' | '(' expr ')'
//! ```

use crate::ast::{BinOp, Builtin, Expr};
use crate::lexer::{lex, Spanned, SyntaxError, Token};

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    params: &'a [String],
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], params: &'a [String]) -> Self {
        Parser {
            tokens,
            pos: 0,
            params,
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn advance(&mut self) -> Token {
        let t = self.cur().token.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.cur().column, message)
    }

    fn expect(&mut self, expected: Token) -> Result<(), SyntaxError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {:?}, got {:?}", expected, self.peek())))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.peek() == &Token::Minus {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut target = self.parse_atom()?;
        while self.peek() == &Token::LBracket {
            self.advance();
            let index = self.parse_expr()?;
            self.expect(Token::RBracket)?;
            target = Expr::Index(Box::new(target), Box::new(index));
        }
        Ok(target)
    }

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        let column = self.cur().column;
        match self.advance() {
            Token::Int(n) => Ok(Expr::Int(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Word(w) => {
                // Parameters shadow builtins, as they would in a lambda.
                if let Some(idx) = self.params.iter().position(|p| p == &w) {
                    return Ok(Expr::Param(idx));
                }
                let Some(builtin) = Builtin::from_name(&w) else {
                    return Err(SyntaxError::new(column, format!("unknown name '{}'", w)));
                };
                self.expect(Token::LParen)?;
                let mut args = Vec::new();
                if self.peek() != &Token::RParen {
                    loop {
                        args.push(self.parse_expr()?);
                        if self.peek() == &Token::Comma {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(Token::RParen)?;
                if args.len() != 1 {
                    return Err(SyntaxError::new(
                        column,
                        format!(
                            "{}() takes exactly one argument ({} given)",
                            builtin.name(),
                            args.len()
                        ),
                    ));
                }
                Ok(Expr::Call(builtin, args))
            }
            other => Err(SyntaxError::new(
                column,
                format!("expected expression, got {:?}", other),
            )),
        }
    }
}

/// Compile an expression body against the macro's declared parameters.
pub fn parse_expr(src: &str, params: &[String]) -> Result<Expr, SyntaxError> {
    let tokens = lex(src)?;
    let mut parser = Parser::new(&tokens, params);
    let expr = parser.parse_expr()?;
    if parser.peek() != &Token::Eof {
        return Err(parser.err(format!("unexpected trailing {:?}", parser.peek())));
    }
    Ok(expr)
}
