//! Lexical scanner shared by the translator and the expression folder.
//!
//! The scanner never fails. Anything it cannot classify comes out as a
//! one-character `Unknown` token and is rejected by whoever consumes it.
//! Trivia (spaces, line breaks, comments) stays in the stream.
//
//  Lexical items, tried in this order at every position:
//
//      Number     ::= [0-9]+
//      Text       ::= '"' [^"]* '"'
//      Operator   ::= '=' | '(' | ')' | ',' | '+' | '-' | <reserved word>
//      Ident      ::= letter (letter | [0-9])*
//      LineBreak  ::= '\r'? '\n'
//      Space      ::= whitespace other than a line break, repeated
//      Comment    ::= '//' [^\n]* '\n'?
//      Unknown    ::= any single character
//
//  Words are matched whole; a word is an operator only if its upper-cased
//  form is a reserved keyword of the configuration.

use crate::model::{Config, PUNCTUATION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Text,
    /// Punctuation and reserved keywords.
    Operator,
    Ident,
    LineBreak,
    Space,
    Comment,
    Unknown,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line the token starts on.
    pub line: usize,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Space | TokenKind::LineBreak | TokenKind::Comment
        )
    }

    /// Case-normalized text, the form every symbol-table lookup uses.
    pub fn word(&self) -> String {
        self.text.to_uppercase()
    }

    /// Human readable form for diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".into(),
            TokenKind::LineBreak => "line break".into(),
            _ => format!("«{}»", self.text),
        }
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    config: &'a Config,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, config: &'a Config) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            config,
            finished: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Byte length of the longest prefix of `rest` whose chars satisfy `pred`.
    fn span_while<F: Fn(char) -> bool>(rest: &str, pred: F) -> usize {
        rest.char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(i, _)| i)
    }

    fn classify(&self) -> (TokenKind, usize) {
        let rest = self.rest();
        let mut chars = rest.chars();
        let Some(first) = chars.next() else {
            return (TokenKind::Eof, 0);
        };

        if first.is_ascii_digit() {
            return (TokenKind::Number, Self::span_while(rest, |c| c.is_ascii_digit()));
        }

        if first == '"' {
            if let Some(close) = rest[1..].find('"') {
                return (TokenKind::Text, close + 2);
            }
        }

        if PUNCTUATION.contains(&first) {
            return (TokenKind::Operator, first.len_utf8());
        }

        if first.is_alphabetic() {
            let len = Self::span_while(rest, |c| c.is_alphabetic() || c.is_ascii_digit());
            let word = rest[..len].to_uppercase();
            let kind = if self.config.is_reserved(&word) {
                TokenKind::Operator
            } else {
                TokenKind::Ident
            };
            return (kind, len);
        }

        if first == '\n' {
            return (TokenKind::LineBreak, 1);
        }
        if rest.starts_with("\r\n") {
            return (TokenKind::LineBreak, 2);
        }

        if first.is_whitespace() {
            let mut len = 0;
            for (i, c) in rest.char_indices() {
                if !c.is_whitespace() || c == '\n' || rest[i..].starts_with("\r\n") {
                    break;
                }
                len = i + c.len_utf8();
            }
            return (TokenKind::Space, len);
        }

        if rest.starts_with("//") {
            let len = rest.find('\n').map_or(rest.len(), |i| i + 1);
            return (TokenKind::Comment, len);
        }

        (TokenKind::Unknown, first.len_utf8())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let (kind, len) = self.classify();
        if kind == TokenKind::Eof {
            self.finished = true;
        }

        let token = Token {
            text: self.rest()[..len].to_string(),
            kind,
            offset: self.pos,
            line: self.line,
        };

        self.pos += len;
        // text literals may span lines too
        self.line += token.text.matches('\n').count();

        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        let config = Config::default();
        Lexer::new(src, &config)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_tokenisation() {
        use TokenKind::*;
        let test_cases = vec![
            (
                "ПУСТЬ Ф(А) = СЛОЖ(А, 1)",
                vec![
                    (Operator, "ПУСТЬ"),
                    (Space, " "),
                    (Ident, "Ф"),
                    (Operator, "("),
                    (Ident, "А"),
                    (Operator, ")"),
                    (Space, " "),
                    (Operator, "="),
                    (Space, " "),
                    (Ident, "СЛОЖ"),
                    (Operator, "("),
                    (Ident, "А"),
                    (Operator, ","),
                    (Space, " "),
                    (Number, "1"),
                    (Operator, ")"),
                    (Eof, ""),
                ],
            ),
            (
                "if 1 then \"a b\" else x1",
                vec![
                    (Operator, "if"),
                    (Space, " "),
                    (Number, "1"),
                    (Space, " "),
                    (Operator, "then"),
                    (Space, " "),
                    (Text, "\"a b\""),
                    (Space, " "),
                    (Operator, "else"),
                    (Space, " "),
                    (Ident, "x1"),
                    (Eof, ""),
                ],
            ),
            (
                "// note\r\n\t@\"open",
                vec![
                    (Comment, "// note\r\n"),
                    (Space, "\t"),
                    (Unknown, "@"),
                    (Unknown, "\""),
                    (Ident, "open"),
                    (Eof, ""),
                ],
            ),
        ];

        for (src, expected) in test_cases {
            let expected: Vec<_> = expected
                .into_iter()
                .map(|(k, t)| (k, t.to_string()))
                .collect();
            assert_eq!(kinds(src), expected, "source: {src:?}");
        }
    }

    #[test]
    fn test_keywords_match_whole_words() {
        use TokenKind::*;
        assert_eq!(
            kinds("IFFY модульный"),
            vec![
                (Ident, "IFFY".to_string()),
                (Space, " ".to_string()),
                (Ident, "модульный".to_string()),
                (Eof, "".to_string()),
            ]
        );
        assert_eq!(kinds("модуль")[0].0, Operator);
    }

    #[test]
    fn test_line_numbers() {
        let config = Config::default();
        let lines: Vec<_> = Lexer::new("A\nB\r\n// c\nD  \n", &config)
            .filter(|t| t.kind == TokenKind::Ident || t.kind == TokenKind::Eof)
            .map(|t| (t.text, t.line))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("A".to_string(), 1),
                ("B".to_string(), 2),
                ("D".to_string(), 4),
                ("".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_multiline_text_advances_line() {
        let config = Config::default();
        let tokens: Vec<_> = Lexer::new("\"a\nb\" Б\n\"\"В", &config)
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.line))
            .collect();
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Text, 1),
                (TokenKind::Ident, 2),
                (TokenKind::Text, 3),
                (TokenKind::Ident, 3),
                (TokenKind::Eof, 3),
            ]
        );
    }

    proptest! {
        #[test]
        fn covers_every_character(s in "\\PC*") {
            let config = Config::default();
            let tokens: Vec<_> = Lexer::new(&s, &config).collect();

            let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
            prop_assert_eq!(eofs, 1);
            let last = tokens.last().unwrap();
            prop_assert_eq!(last.kind, TokenKind::Eof);
            prop_assert_eq!(last.offset, s.len());

            let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
            prop_assert_eq!(joined, s);
        }

        #[test]
        fn never_yields_empty_tokens(s in "[a-zA-Z0-9 \\n\\r\"/=(),+@-]*") {
            let config = Config::default();
            for token in Lexer::new(&s, &config) {
                prop_assert!(token.kind == TokenKind::Eof || !token.text.is_empty());
            }
        }
    }
}
