//! Declarator parsing for pointer-to-function typedefs
//!
//! Doxygen only gives the raw definition string for these typedefs, e.g.
//! `typedef void(* hsa_amd_deallocation_callback_t)(void *ptr, void *data)`.
//! The grammar handled here is the subset used by the headers: a return type,
//! a parenthesised pointer declarator, and a parameter list whose entries may
//! carry pointers, arrays, or be function pointers themselves.

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Star,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Punct(char),
}

impl Token {
    fn is_word(&self) -> bool {
        matches!(self, Token::Word(_))
    }

    fn as_str(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Star => "*".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::LBracket => "[".to_string(),
            Token::RBracket => "]".to_string(),
            Token::Comma => ",".to_string(),
            Token::Semicolon => ";".to_string(),
            Token::Punct(c) => c.to_string(),
        }
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Word(word));
            continue;
        }
        chars.next();
        tokens.push(match c {
            '*' => Token::Star,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            other => Token::Punct(other),
        });
    }
    tokens
}

/// Reassemble tokens with C-like spacing
fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for tok in tokens {
        if let Some(p) = prev {
            let space = (p.is_word() && (tok.is_word() || *tok == Token::Star || *tok == Token::LParen))
                || *p == Token::Comma;
            if space {
                out.push(' ');
            }
        }
        out.push_str(&tok.as_str());
        prev = Some(tok);
    }
    out
}

/// A parameter of a parsed declarator, split around its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclParam {
    /// Text before the name, including the separating space if any
    pub before: String,
    pub name: Option<String>,
    /// Text after the name (array suffix, nested parameter list)
    pub after: String,
}

impl DeclParam {
    fn from_tokens(tokens: &[Token]) -> Self {
        // nested function pointer: type ( * name ) ( ... )
        if let Some(open) = tokens.iter().position(|t| *t == Token::LParen) {
            let mut idx = open + 1;
            while tokens.get(idx) == Some(&Token::Star) {
                idx += 1;
            }
            if idx > open + 1 {
                if let (Some(Token::Word(name)), Some(Token::RParen)) = (tokens.get(idx), tokens.get(idx + 1)) {
                    return Self {
                        before: join_tokens(&tokens[..idx]),
                        name: Some(name.clone()),
                        after: join_tokens(&tokens[idx + 1..]),
                    };
                }
            }
        }

        let mut core_end = tokens.len();
        if tokens.last() == Some(&Token::RBracket) {
            if let Some(open) = tokens.iter().rposition(|t| *t == Token::LBracket) {
                core_end = open;
            }
        }
        let (core, suffix) = tokens.split_at(core_end);

        match core.last() {
            Some(Token::Word(name)) if core.len() >= 2 => {
                let head = &core[..core.len() - 1];
                let mut before = join_tokens(head);
                if head.last().map(|t| t.is_word()).unwrap_or(false) {
                    before.push(' ');
                }
                Self {
                    before,
                    name: Some(name.clone()),
                    after: join_tokens(suffix),
                }
            }
            _ => Self {
                before: join_tokens(tokens),
                name: None,
                after: String::new(),
            },
        }
    }
}

/// A parsed `typedef R (*name)(params)` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnPointerDecl {
    /// Everything before the pointer declarator, e.g. `typedef void`
    pub return_prefix: String,
    /// Number of `*` in the pointer declarator
    pub stars: usize,
    pub name: String,
    pub params: Vec<DeclParam>,
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> ConvertError {
        ConvertError::MalformedDeclarator {
            declaration: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}' at token {}", token.as_str(), self.pos)))
        }
    }

    fn parse_fn_pointer(&mut self) -> Result<FnPointerDecl> {
        let start = self.pos;
        while let Some(tok) = self.peek() {
            if *tok == Token::LParen {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("missing return type"));
        }
        let return_prefix = join_tokens(&self.tokens[start..self.pos]);

        self.expect(Token::LParen)?;
        let mut stars = 0;
        while self.peek() == Some(&Token::Star) {
            stars += 1;
            self.pos += 1;
        }
        if stars == 0 {
            return Err(self.error("not a pointer declarator"));
        }
        let name = match self.peek() {
            Some(Token::Word(w)) => w.clone(),
            _ => return Err(self.error("missing declarator name")),
        };
        self.pos += 1;
        self.expect(Token::RParen)?;

        self.expect(Token::LParen)?;
        let params = self.parse_params()?;
        self.expect(Token::RParen)?;

        if self.peek() == Some(&Token::Semicolon) {
            self.pos += 1;
        }
        if self.pos != self.tokens.len() {
            return Err(self.error("trailing tokens after parameter list"));
        }

        Ok(FnPointerDecl {
            return_prefix,
            stars,
            name,
            params,
        })
    }

    /// Parameters up to (not including) the closing parenthesis
    fn parse_params(&mut self) -> Result<Vec<DeclParam>> {
        let mut params = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            return Ok(params);
        }
        loop {
            let start = self.pos;
            self.skip_until_separator()?;
            if self.pos == start {
                return Err(self.error("empty parameter"));
            }
            params.push(DeclParam::from_tokens(&self.tokens[start..self.pos]));
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => return Ok(params),
                _ => return Err(self.error("unterminated parameter list")),
            }
        }
    }

    /// Advance to the next top-level ',' or ')'
    fn skip_until_separator(&mut self) -> Result<()> {
        while let Some(tok) = self.peek() {
            match tok {
                Token::Comma | Token::RParen => return Ok(()),
                Token::LParen => self.skip_group(Token::LParen, Token::RParen)?,
                Token::LBracket => self.skip_group(Token::LBracket, Token::RBracket)?,
                _ => self.pos += 1,
            }
        }
        Err(self.error("unexpected end of declaration"))
    }

    /// Skip a balanced group starting at the current opening token
    fn skip_group(&mut self, open: Token, close: Token) -> Result<()> {
        self.expect(open)?;
        while let Some(tok) = self.peek() {
            if *tok == close {
                self.pos += 1;
                return Ok(());
            }
            match tok {
                Token::LParen => self.skip_group(Token::LParen, Token::RParen)?,
                Token::LBracket => self.skip_group(Token::LBracket, Token::RBracket)?,
                _ => self.pos += 1,
            }
        }
        Err(self.error("unbalanced brackets"))
    }
}

/// Parse a pointer-to-function typedef definition
pub fn parse_fn_pointer_typedef(definition: &str) -> Result<FnPointerDecl> {
    Parser::new(definition).parse_fn_pointer()
}

/// Insert a declarator name into an abstract function-pointer type,
/// `void(*)(int)` + `cb` -> `void (*cb)(int)`
pub fn inline_declarator_name(type_text: &str, name: &str) -> Option<String> {
    type_text
        .find("(*)")
        .map(|idx| format!("{} (*{}){}", type_text[..idx].trim_end(), name, &type_text[idx + 3..]))
}
