use lachs::Span;

#[lachs::token]
pub enum Token {
    // Keywords
    #[terminal("def")]
    Def,
    #[terminal("let")]
    Let,
    #[terminal("if")]
    If,
    #[terminal("else")]
    Else,
    #[terminal("while")]
    While,
    #[terminal("for")]
    For,
    #[terminal("return")]
    Return,
    #[terminal("macro")]
    Macro,
    #[terminal("pattern")]
    Pattern,
    #[terminal("expand")]
    Expand,
    #[terminal("returns")]
    Returns,
    #[terminal("true")]
    True,
    #[terminal("false")]
    False,
    // Multi-character operators before their single-character prefixes
    #[terminal("->")]
    Arrow,
    #[terminal("<=")]
    LtEq,
    #[terminal(">=")]
    GtEq,
    #[terminal("==")]
    EqEq,
    #[terminal("!=")]
    BangEq,
    #[terminal("&&")]
    AndAnd,
    #[terminal("||")]
    OrOr,
    #[terminal("<")]
    Lt,
    #[terminal(">")]
    Gt,
    #[terminal("+")]
    Plus,
    #[terminal("-")]
    Minus,
    #[terminal("*")]
    Star,
    #[terminal("/")]
    Slash,
    #[terminal("%")]
    Percent,
    #[terminal("!")]
    Bang,
    #[terminal("=")]
    Equals,
    #[terminal(",")]
    Comma,
    #[terminal(":")]
    Colon,
    #[terminal("$")]
    Dollar,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("{")]
    LBrace,
    #[terminal("}")]
    RBrace,
    // Literals
    #[literal("[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[literal("[0-9]+")]
    Integer,
    #[literal(r#""([^"\\]|\\.)*""#)]
    StringLiteral,
}

impl Token {
    pub fn pos(&self) -> Span {
        match self {
            Token::Def(inner) => inner.position.clone(),
            Token::Let(inner) => inner.position.clone(),
            Token::If(inner) => inner.position.clone(),
            Token::Else(inner) => inner.position.clone(),
            Token::While(inner) => inner.position.clone(),
            Token::For(inner) => inner.position.clone(),
            Token::Return(inner) => inner.position.clone(),
            Token::Macro(inner) => inner.position.clone(),
            Token::Pattern(inner) => inner.position.clone(),
            Token::Expand(inner) => inner.position.clone(),
            Token::Returns(inner) => inner.position.clone(),
            Token::True(inner) => inner.position.clone(),
            Token::False(inner) => inner.position.clone(),
            Token::Arrow(inner) => inner.position.clone(),
            Token::LtEq(inner) => inner.position.clone(),
            Token::GtEq(inner) => inner.position.clone(),
            Token::EqEq(inner) => inner.position.clone(),
            Token::BangEq(inner) => inner.position.clone(),
            Token::AndAnd(inner) => inner.position.clone(),
            Token::OrOr(inner) => inner.position.clone(),
            Token::Lt(inner) => inner.position.clone(),
            Token::Gt(inner) => inner.position.clone(),
            Token::Plus(inner) => inner.position.clone(),
            Token::Minus(inner) => inner.position.clone(),
            Token::Star(inner) => inner.position.clone(),
            Token::Slash(inner) => inner.position.clone(),
            Token::Percent(inner) => inner.position.clone(),
            Token::Bang(inner) => inner.position.clone(),
            Token::Equals(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::Colon(inner) => inner.position.clone(),
            Token::Dollar(inner) => inner.position.clone(),
            Token::LParen(inner) => inner.position.clone(),
            Token::RParen(inner) => inner.position.clone(),
            Token::LBrace(inner) => inner.position.clone(),
            Token::RBrace(inner) => inner.position.clone(),
            Token::Ident(inner) => inner.position.clone(),
            Token::Integer(inner) => inner.position.clone(),
            Token::StringLiteral(inner) => inner.position.clone(),
        }
    }

    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        match self {
            Token::Def(_) => "'def'".to_string(),
            Token::Let(_) => "'let'".to_string(),
            Token::If(_) => "'if'".to_string(),
            Token::Else(_) => "'else'".to_string(),
            Token::While(_) => "'while'".to_string(),
            Token::For(_) => "'for'".to_string(),
            Token::Return(_) => "'return'".to_string(),
            Token::Macro(_) => "'macro'".to_string(),
            Token::Pattern(_) => "'pattern'".to_string(),
            Token::Expand(_) => "'expand'".to_string(),
            Token::Returns(_) => "'returns'".to_string(),
            Token::True(_) => "'true'".to_string(),
            Token::False(_) => "'false'".to_string(),
            Token::Arrow(_) => "'->'".to_string(),
            Token::LtEq(_) => "'<='".to_string(),
            Token::GtEq(_) => "'>='".to_string(),
            Token::EqEq(_) => "'=='".to_string(),
            Token::BangEq(_) => "'!='".to_string(),
            Token::AndAnd(_) => "'&&'".to_string(),
            Token::OrOr(_) => "'||'".to_string(),
            Token::Lt(_) => "'<'".to_string(),
            Token::Gt(_) => "'>'".to_string(),
            Token::Plus(_) => "'+'".to_string(),
            Token::Minus(_) => "'-'".to_string(),
            Token::Star(_) => "'*'".to_string(),
            Token::Slash(_) => "'/'".to_string(),
            Token::Percent(_) => "'%'".to_string(),
            Token::Bang(_) => "'!'".to_string(),
            Token::Equals(_) => "'='".to_string(),
            Token::Comma(_) => "','".to_string(),
            Token::Colon(_) => "':'".to_string(),
            Token::Dollar(_) => "'$'".to_string(),
            Token::LParen(_) => "'('".to_string(),
            Token::RParen(_) => "')'".to_string(),
            Token::LBrace(_) => "'{'".to_string(),
            Token::RBrace(_) => "'}'".to_string(),
            Token::Ident(inner) => format!("identifier '{}'", inner.value),
            Token::Integer(inner) => format!("integer '{}'", inner.value),
            Token::StringLiteral(inner) => format!("string {}", inner.value),
        }
    }
}

/// Strip `//` line comments and `/* … */` block comments from source code.
///
/// Comment bytes are replaced with spaces (newlines are kept) so the spans
/// produced by the lexer still point at the right lines. Comment markers
/// inside string literals are left alone.
pub fn strip_comments(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    enum Mode {
        Code,
        Str,
        Line,
        Block,
    }
    let mut mode = Mode::Code;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match mode {
            Mode::Code => match (c, next) {
                ('"', _) => {
                    mode = Mode::Str;
                    out.push(c);
                    i += 1;
                }
                ('/', Some('/')) => {
                    mode = Mode::Line;
                    out.push_str("  ");
                    i += 2;
                }
                ('/', Some('*')) => {
                    mode = Mode::Block;
                    out.push_str("  ");
                    i += 2;
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            },
            Mode::Str => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 1;
                    }
                } else if c == '"' {
                    mode = Mode::Code;
                }
                i += 1;
            }
            Mode::Line => {
                if c == '\n' {
                    mode = Mode::Code;
                    out.push('\n');
                } else {
                    out.push(' ');
                }
                i += 1;
            }
            Mode::Block => {
                if c == '\n' {
                    out.push('\n');
                    i += 1;
                } else if c == '*' && next == Some('/') {
                    mode = Mode::Code;
                    out.push_str("  ");
                    i += 2;
                } else {
                    out.push(' ');
                    i += 1;
                }
            }
        }
    }

    out
}

/// Resolve backslash escapes in the raw text of a string token (with its
/// surrounding quotes already removed).
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_line_comment_keeps_lines() {
        let stripped = strip_comments("let x = 1 // trailing\nlet y = 2");
        assert_eq!(stripped.lines().count(), 2);
        assert!(!stripped.contains("trailing"));
        assert!(stripped.contains("let y = 2"));
    }

    #[test]
    fn strip_block_comment_keeps_newlines() {
        let stripped = strip_comments("a /* one\ntwo */ b");
        assert_eq!(stripped.lines().count(), 2);
        assert!(!stripped.contains("one"));
        assert!(stripped.contains('a'));
        assert!(stripped.contains('b'));
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        let source = r#"println("not // a comment")"#;
        assert_eq!(strip_comments(source), source);
    }

    #[test]
    fn unescape_resolves_common_escapes() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
    }
}
