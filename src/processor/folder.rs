//! Operator-precedence folder for expressions that are not fully
//! parenthesized (`1 + 2 - 3`, `IF c THEN a ELSE b`).
//!
//! Operands and operators are shifted onto one explicit stack; every time an
//! operator completes, `fold` reduces the top of the stack as far as the
//! weight table allows. Grouping is made explicit with `[ … ]`, conditionals
//! become a call to the runtime's select function. The reduction is a loop,
//! so nesting depth is bounded by the heap, not the call stack.

use std::fmt;

use super::error::{CompileResult, ErrorKind};
use super::lexer::{Token, TokenKind};
use super::scope::{Brackets, Scopes};
use super::translator::check_number;
use crate::writer::emitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Run,
    Let,
    Assign,
    Close,
    If,
    Then,
    Else,
    Comma,
    Plus,
    Minus,
    Open,
    /// Sentinel pushed at end of input; forces the final cascade.
    End,
}

impl Op {
    pub fn from_word(word: &str) -> Option<Op> {
        let op = match word {
            "RUN" => Op::Run,
            "LET" => Op::Let,
            "=" => Op::Assign,
            ")" => Op::Close,
            "IF" => Op::If,
            "THEN" => Op::Then,
            "ELSE" => Op::Else,
            "," => Op::Comma,
            "+" => Op::Plus,
            "-" => Op::Minus,
            "(" => Op::Open,
            _ => return None,
        };
        Some(op)
    }

    /// Lower binds first. `End` is below everything so it never defers.
    pub fn weight(self) -> u8 {
        match self {
            Op::End => 0,
            Op::Run | Op::Let => 10,
            Op::Assign => 20,
            Op::Close => 30,
            Op::If | Op::Then | Op::Else => 40,
            Op::Comma => 50,
            Op::Plus | Op::Minus => 60,
            Op::Open => 70,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Run => "RUN",
            Op::Let => "LET",
            Op::Assign => "=",
            Op::Close => ")",
            Op::If => "IF",
            Op::Then => "THEN",
            Op::Else => "ELSE",
            Op::Comma => ",",
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Open => "(",
            Op::End => "",
        }
    }

    fn is_binary(self) -> bool {
        matches!(
            self,
            Op::Run | Op::Let | Op::Assign | Op::Comma | Op::Plus | Op::Minus
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Operand(String),
    Operator(Op),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Expect an operand or an opening construct.
    Lvalue,
    /// Expect a continuation, a close or a branch keyword.
    Operator,
    /// Expect an operand after a binary or branch operator.
    Rvalue,
}

fn malformed(found: impl Into<String>) -> ErrorKind {
    ErrorKind::StructuralSyntaxError {
        expected: "a well-formed expression".into(),
        found: found.into(),
    }
}

pub struct Folder<'a> {
    scopes: &'a Scopes<'a>,
    stack: Vec<Entry>,
    side: Side,
    brackets: Brackets,
    line: usize,
    done: bool,
}

impl<'a> Folder<'a> {
    pub fn new(scopes: &'a Scopes<'a>) -> Self {
        Self {
            scopes,
            stack: Vec::new(),
            side: Side::Lvalue,
            brackets: Brackets::default(),
            line: 1,
            done: false,
        }
    }

    pub fn feed(&mut self, token: &Token) -> CompileResult<()> {
        self.line = token.line;
        if token.is_trivia() {
            return Ok(());
        }
        self.step(token).map_err(|e| e.at(self.line))
    }

    fn step(&mut self, token: &Token) -> Result<(), ErrorKind> {
        if self.done {
            return Err(malformed(token.describe()));
        }

        let op = match token.kind {
            TokenKind::Operator => Op::from_word(&token.word()),
            TokenKind::Eof => Some(Op::End),
            _ => None,
        };

        match (self.side, op) {
            (Side::Lvalue | Side::Rvalue, Some(Op::Open)) => {
                self.brackets.open();
                self.stack.push(Entry::Operator(Op::Open));
                self.side = Side::Lvalue;
            }
            (Side::Lvalue | Side::Rvalue, Some(Op::If)) => {
                self.stack.push(Entry::Operator(Op::If));
                self.side = Side::Lvalue;
            }
            (Side::Lvalue | Side::Rvalue, None) => {
                let operand = self.operand(token)?;
                self.stack.push(Entry::Operand(operand));
                self.side = Side::Operator;
            }
            (Side::Operator, Some(Op::Close)) => {
                self.brackets.close()?;
                self.shift_and_fold(Op::Close)?;
            }
            (Side::Operator, Some(op @ (Op::Then | Op::Else))) => {
                self.shift_and_fold(op)?;
                self.side = Side::Lvalue;
            }
            (Side::Operator, Some(op)) if op.is_binary() => {
                self.shift_and_fold(op)?;
                self.side = Side::Rvalue;
            }
            (Side::Operator, Some(Op::End)) => {
                self.brackets.ensure_closed()?;
                self.shift_and_fold(Op::End)?;
                self.done = true;
            }
            (side, _) => {
                let expected = match side {
                    Side::Operator => "an operator",
                    Side::Lvalue | Side::Rvalue => "an operand",
                };
                return Err(ErrorKind::StructuralSyntaxError {
                    expected: expected.into(),
                    found: token.describe(),
                });
            }
        }
        Ok(())
    }

    fn operand(&self, token: &Token) -> Result<String, ErrorKind> {
        let config = self.scopes.config();
        match token.kind {
            TokenKind::Number => Ok(check_number(&token.text, config)?.to_string()),
            TokenKind::Ident => {
                let name = token.word();
                self.scopes.resolve(&name)?;
                Ok(emitter::symbol(config, &name))
            }
            TokenKind::Text => Ok(emitter::text(config, &token.text)),
            _ => Err(ErrorKind::StructuralSyntaxError {
                expected: "an operand".into(),
                found: token.describe(),
            }),
        }
    }

    fn shift_and_fold(&mut self, op: Op) -> Result<(), ErrorKind> {
        self.stack.push(Entry::Operator(op));
        self.fold()
    }

    fn pop_operator(&mut self) -> Result<Op, ErrorKind> {
        match self.stack.pop() {
            Some(Entry::Operator(op)) => Ok(op),
            Some(Entry::Operand(text)) => Err(malformed(format!("operand «{text}»"))),
            None => Err(malformed("an empty stack")),
        }
    }

    fn pop_operand(&mut self) -> Result<String, ErrorKind> {
        match self.stack.pop() {
            Some(Entry::Operand(text)) => Ok(text),
            Some(Entry::Operator(op)) => Err(malformed(format!("operator «{op}»"))),
            None => Err(malformed("an empty stack")),
        }
    }

    fn expect_operator(&mut self, expected: Op) -> Result<(), ErrorKind> {
        match self.pop_operator()? {
            op if op == expected => Ok(()),
            op => Err(malformed(format!("«{op}» where «{expected}» belongs"))),
        }
    }

    fn push_all(&mut self, entries: impl IntoIterator<Item = Entry>) {
        self.stack.extend(entries);
    }

    /// Reduce the top of the stack. Each pass looks at the freshly shifted
    /// operator `o2`, the operand `r` beneath it and, if present, the
    /// operator `o1` and operand `l` below that.
    fn fold(&mut self) -> Result<(), ErrorKind> {
        use Entry::{Operand, Operator};

        loop {
            let o2 = self.pop_operator()?;
            let r = self.pop_operand()?;

            if self.stack.is_empty() {
                if o2 == Op::End {
                    self.stack.push(Operand(r));
                } else {
                    self.push_all([Operand(r), Operator(o2)]);
                }
                return Ok(());
            }

            let o1 = self.pop_operator()?;

            // still assembling a conditional
            if matches!((o1, o2), (Op::If, Op::Then) | (Op::Then, Op::Else)) {
                self.push_all([Operator(o1), Operand(r), Operator(o2)]);
                return Ok(());
            }

            if o1 == Op::Open && o2 == Op::Close {
                self.stack.push(Operand(format!("[({r})]")));
                return Ok(());
            }

            // an opening construct waiting for its partner
            if matches!(o1, Op::Open | Op::If | Op::Then) {
                self.push_all([Operator(o1), Operand(r), Operator(o2)]);
                return Ok(());
            }

            let l = self.pop_operand()?;

            if o1.weight() < o2.weight() {
                self.push_all([Operand(l), Operator(o1), Operand(r), Operator(o2)]);
                return Ok(());
            }

            let reduced = if o1 == Op::Else {
                self.expect_operator(Op::Then)?;
                let cond = self.pop_operand()?;
                self.expect_operator(Op::If)?;
                emitter::select(self.scopes.config(), &cond, &l, &r)
            } else {
                format!("[{l}{o1}{r}]")
            };
            self.push_all([Operand(reduced), Operator(o2)]);
        }
    }

    /// The single grouped operand left after the end-of-input cascade.
    pub fn finish(mut self) -> CompileResult<String> {
        let line = self.line;
        if !self.done {
            let err = ErrorKind::StructuralSyntaxError {
                expected: "an operator".into(),
                found: "end of input".into(),
            };
            return Err(err.at(line));
        }
        match (self.stack.pop(), self.stack.is_empty()) {
            (Some(Entry::Operand(result)), true) => Ok(result),
            _ => Err(malformed("dangling operators or operands").at(line)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Config;
    use crate::processor::lexer::Lexer;
    use proptest::prelude::*;

    fn fold_str(src: &str) -> CompileResult<String> {
        let config = Config::default();
        let scopes = Scopes::new(&config);
        let mut folder = Folder::new(&scopes);
        for token in Lexer::new(src, &config) {
            folder.feed(&token)?;
        }
        folder.finish()
    }

    #[test]
    fn test_folding() {
        let test_cases = vec![
            ("1 + 2 - 3", "[[1+2]-3]"),
            ("1 - 2 + 3", "[[1-2]+3]"),
            ("IF 1 - 1 THEN 1 ELSE 0", "select(([1-1]),(1),(0))"),
            ("1, (2, 3 + (3)) - 5", "[1,[[([2,[3+[(3)]]])]-5]]"),
            ("(1)", "[(1)]"),
            ("1 - (2 + 3)", "[1-[([2+3])]]"),
            ("1 + if 1 then 2 else 3", "[1+select((1),(2),(3))]"),
            ("IF 1 THEN 2 ELSE 3 + 4", "select((1),(2),([3+4]))"),
            (
                "IF 1 THEN IF 0 THEN 1 ELSE 2 ELSE 3",
                "select((1),(select((0),(1),(2))),(3))",
            ),
            ("7", "7"),
            ("007 + ВЫВОД", "[7+m_ВЫВОД]"),
            ("\"а\", 1", "[m_ТЕКСТ(\"а\"),1]"),
        ];

        for (src, expected) in test_cases {
            assert_eq!(fold_str(src).as_deref(), Ok(expected), "source: {src}");
        }
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 5000;
        let src = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let out = fold_str(&src).unwrap();
        assert!(out.starts_with("[([(["));
        assert_eq!(out.matches('(').count(), depth);
    }

    fn kind_name(kind: &ErrorKind) -> &'static str {
        match kind {
            ErrorKind::TooLongIdentifier { .. } => "too-long",
            ErrorKind::AlreadyDefined { .. } => "defined",
            ErrorKind::UndefinedSymbol { .. } => "undefined",
            ErrorKind::NumericOutOfRange { .. } => "range",
            ErrorKind::UnbalancedParenthesis { .. } => "unbalanced",
            ErrorKind::AlreadyOpen { .. } => "open",
            ErrorKind::StructuralSyntaxError { .. } => "syntax",
        }
    }

    #[test]
    fn test_errors() {
        let test_cases = vec![
            ("1 +", "syntax"),
            ("", "syntax"),
            ("1 2", "syntax"),
            ("(1", "unbalanced"),
            ("1)", "unbalanced"),
            ("1 THEN 2", "syntax"),
            ("IF 1 THEN 2", "syntax"),
            ("1001", "range"),
            ("X + 1", "undefined"),
            ("ДЛИННЫЙХ", "too-long"),
            ("1 @", "syntax"),
        ];

        for (src, expected) in test_cases {
            let err = fold_str(src).unwrap_err();
            assert_eq!(kind_name(err.kind()), expected, "source: {src}, got {err}");
        }
    }

    #[test]
    fn test_error_line() {
        let err = fold_str("1 +\n\n+ 2").unwrap_err();
        assert_eq!(err.line(), 3);
        assert_eq!(err.to_string(), "Expected an operand, found «+» at line 3.");
    }

    #[test]
    fn test_weights() {
        assert!(Op::End.weight() < Op::Run.weight());
        assert_eq!(Op::from_word("ELSE").map(Op::weight), Some(40));
        assert_eq!(Op::from_word("("), Some(Op::Open));
        assert_eq!(Op::from_word("MODULE"), None);
    }

    proptest! {
        #[test]
        fn flat_chains_always_fold(
            first in 0u32..=1000,
            rest in proptest::collection::vec(
                (prop_oneof![Just("+"), Just("-"), Just(",")], 0u32..=1000),
                0..20,
            )
        ) {
            let src = rest
                .iter()
                .fold(first.to_string(), |acc, (op, n)| format!("{acc} {op} {n}"));
            let once = fold_str(&src);
            prop_assert!(once.is_ok(), "{src}: {once:?}");
            prop_assert_eq!(once, fold_str(&src));
        }
    }
}
