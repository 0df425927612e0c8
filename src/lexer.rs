//! Lexer: character stream to token stream.
//!
//! Single pass over the input, one token per call to [`Lexer::next_token`].
//! The individual token shapes are nom combinators; the `Lexer` struct owns
//! the remaining input slice and advances it as tokens are consumed. ASCII
//! whitespace between tokens is skipped. Bytes that match no token shape
//! come back as one `Illegal` token each, and once the input is exhausted
//! every further call returns `Eof`.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, satisfy},
    combinator::recognize,
    sequence::pair,
};

use crate::token::{Token, TokenKind, lookup_keyword};

pub struct Lexer<'a> {
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { rest: input }
    }

    /// Produce the next token, advancing past it.
    pub fn next_token(&mut self) -> Token {
        self.rest = skip_whitespace(self.rest);

        if self.rest.is_empty() {
            return Token::new(TokenKind::Eof, "");
        }

        match lex_token(self.rest) {
            Ok((rest, token)) => {
                self.rest = rest;
                token
            }
            Err(_) => {
                // No token shape matched: emit the offending byte as Illegal
                // and move on so lexing can continue.
                let mut chars = self.rest.chars();
                match chars.next() {
                    Some(c) => {
                        let token =
                            Token::new(TokenKind::Illegal, &self.rest[..c.len_utf8()]);
                        self.rest = chars.as_str();
                        token
                    }
                    None => Token::new(TokenKind::Eof, ""),
                }
            }
        }
    }
}

fn skip_whitespace(input: &str) -> &str {
    match multispace0::<&str, nom::error::Error<&str>>(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

fn lex_token(input: &str) -> IResult<&str, Token> {
    alt((
        lex_operator,
        lex_string,
        lex_integer,
        lex_identifier,
    ))
    .parse(input)
}

/// Operators and delimiters. Two-character operators are listed before the
/// single-character operators they start with, which is the one-character
/// lookahead the token shapes need (`==` vs `=`, `!=` vs `!`).
fn lex_operator(input: &str) -> IResult<&str, Token> {
    let (rest, literal) = alt((
        tag("=="),
        tag("!="),
        tag("="),
        tag("+"),
        tag("-"),
        tag("!"),
        tag("*"),
        tag("/"),
        tag("<"),
        tag(">"),
        tag(","),
        tag(";"),
        tag(":"),
        tag("("),
        tag(")"),
        tag("{"),
        tag("}"),
        tag("["),
        tag("]"),
    ))
    .parse(input)?;

    let kind = match literal {
        "==" => TokenKind::Eq,
        "!=" => TokenKind::NotEq,
        "=" => TokenKind::Assign,
        "+" => TokenKind::Plus,
        "-" => TokenKind::Minus,
        "!" => TokenKind::Bang,
        "*" => TokenKind::Asterisk,
        "/" => TokenKind::Slash,
        "<" => TokenKind::Lt,
        ">" => TokenKind::Gt,
        "," => TokenKind::Comma,
        ";" => TokenKind::Semicolon,
        ":" => TokenKind::Colon,
        "(" => TokenKind::LParen,
        ")" => TokenKind::RParen,
        "{" => TokenKind::LBrace,
        "}" => TokenKind::RBrace,
        "[" => TokenKind::LBracket,
        "]" => TokenKind::RBracket,
        _ => TokenKind::Illegal,
    };

    Ok((rest, Token::new(kind, literal)))
}

/// String literal: bytes verbatim between double quotes, no escapes.
fn lex_string(input: &str) -> IResult<&str, Token> {
    let (rest, _) = char('"').parse(input)?;
    let (rest, contents) = take_while(|c| c != '"').parse(rest)?;
    let (rest, _) = char('"').parse(rest)?;
    Ok((rest, Token::new(TokenKind::String, contents)))
}

/// Integer literal: one or more ASCII digits. The numeric value is parsed
/// later, by the parser, so overflow is reported there.
fn lex_integer(input: &str) -> IResult<&str, Token> {
    let (rest, digits) = take_while1(|c: char| c.is_ascii_digit()).parse(input)?;
    Ok((rest, Token::new(TokenKind::Int, digits)))
}

/// Identifier or keyword: `[A-Za-z_][A-Za-z_0-9]*`, then the keyword table.
fn lex_identifier(input: &str) -> IResult<&str, Token> {
    let (rest, ident) = recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)?;

    Ok((rest, Token::new(lookup_keyword(ident), ident)))
}
