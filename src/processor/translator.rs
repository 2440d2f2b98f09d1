//! Module/function translator.
//!
//! A token-at-a-time state machine over declarations whose bodies are
//! already fully parenthesized:
//!
//! ```text
//! program  ::= module*
//! module   ::= МОДУЛЬ name function* СТАРТ entry
//! function ::= ПУСТЬ name '(' [param (',' param)*] ')' '=' body
//! ```
//!
//! `transition` is pure; it only decides the next state and which effect
//! the token has. `Translator` applies effects to the scopes and emitter.

use snafu::OptionExt;

use super::error::{CompileResult, ErrorKind, NumericOutOfRangeSnafu};
use super::lexer::{Token, TokenKind};
use super::scope::Scopes;
use crate::model::{Config, Keywords};
use crate::writer::emitter::Emitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Root,
    ModuleName,
    InModule,
    FunctionName,
    ParamsOpen,
    /// Just after `(`: a parameter or `)`.
    ParamFirst,
    /// After a parameter: `,` or `)`.
    ParamSep,
    /// After `,`: a parameter.
    ParamNext,
    Assign,
    Body,
    ModuleEnd,
}

impl State {
    fn expected(self) -> &'static str {
        match self {
            State::Root => "a module declaration",
            State::ModuleName => "a module name",
            State::InModule => "a function declaration or the module end",
            State::FunctionName => "a function name",
            State::ParamsOpen => "a parameter list",
            State::ParamFirst => "a parameter or «)»",
            State::ParamSep => "«,» or «)»",
            State::ParamNext => "a parameter",
            State::Assign => "«=»",
            State::Body => "a function body",
            State::ModuleEnd => "the name of the exported function",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenModule(String),
    OpenFunction(String),
    /// `(`, `)`, `,`, `+` or `-`, emitted verbatim.
    Punct(String),
    Param(String),
    Assign,
    CloseFunction,
    SelfRef,
    Number(String),
    Text(String),
    Symbol(String),
    CloseModule(String),
}

fn unexpected(state: State, token: &Token) -> ErrorKind {
    ErrorKind::StructuralSyntaxError {
        expected: state.expected().into(),
        found: token.describe(),
    }
}

/// Decide where `token` leads from `state`. Trivia must be filtered out
/// beforehand.
pub fn transition(
    state: State,
    token: &Token,
    kw: &Keywords,
) -> Result<(State, Option<Effect>), ErrorKind> {
    use Effect::*;
    use TokenKind as K;

    let word = token.word();

    let next = match (state, token.kind) {
        (State::Root, K::Eof) => (State::Root, None),
        (State::Root, K::Operator) if word == kw.module => (State::ModuleName, None),

        (State::ModuleName, K::Ident) => (State::InModule, Some(OpenModule(word))),

        (State::InModule, K::Operator) if word == kw.function => (State::FunctionName, None),
        (State::InModule, K::Operator) if word == kw.start => (State::ModuleEnd, None),

        (State::FunctionName, K::Ident) => (State::ParamsOpen, Some(OpenFunction(word))),

        (State::ParamsOpen, K::Operator) if word == "(" => (State::ParamFirst, Some(Punct(word))),

        (State::ParamFirst | State::ParamNext, K::Ident) => (State::ParamSep, Some(Param(word))),
        (State::ParamFirst | State::ParamSep, K::Operator) if word == ")" => {
            (State::Assign, Some(Punct(word)))
        }
        (State::ParamSep, K::Operator) if word == "," => (State::ParamNext, Some(Punct(word))),

        (State::Assign, K::Operator) if word == "=" => (State::Body, Some(Assign)),

        (State::Body, K::Operator) if word == kw.function => {
            (State::FunctionName, Some(CloseFunction))
        }
        (State::Body, K::Operator) if word == kw.start => (State::ModuleEnd, Some(CloseFunction)),
        (State::Body, K::Operator) if word == kw.self_ref => (State::Body, Some(SelfRef)),
        (State::Body, K::Operator) if matches!(word.as_str(), "(" | ")" | "," | "+" | "-") => {
            (State::Body, Some(Punct(word)))
        }
        (State::Body, K::Number) => (State::Body, Some(Number(token.text.clone()))),
        (State::Body, K::Text) => (State::Body, Some(Text(token.text.clone()))),
        (State::Body, K::Ident) => (State::Body, Some(Symbol(word))),

        (State::ModuleEnd, K::Ident) => (State::Root, Some(CloseModule(word))),

        _ => return Err(unexpected(state, token)),
    };

    Ok(next)
}

/// Parse a numeric literal and check it against the configured range.
pub fn check_number(text: &str, config: &Config) -> Result<u32, ErrorKind> {
    let range = config.number_range;
    text.parse::<u32>()
        .ok()
        .filter(|v| range.contains(*v))
        .context(NumericOutOfRangeSnafu {
            text,
            min: range.min,
            max: range.max,
        })
}

pub struct Translator<'a> {
    config: &'a Config,
    scopes: Scopes<'a>,
    out: Emitter<'a>,
    state: State,
    line: usize,
}

impl<'a> Translator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            scopes: Scopes::new(config),
            out: Emitter::new(config),
            state: State::Root,
            line: 1,
        }
    }

    pub fn feed(&mut self, token: &Token) -> CompileResult<()> {
        self.line = token.line;
        if token.is_trivia() {
            return Ok(());
        }

        let (next, effect) =
            transition(self.state, token, &self.config.keywords).map_err(|e| e.at(self.line))?;
        if let Some(effect) = effect {
            self.apply(effect).map_err(|e| e.at(self.line))?;
        }
        self.state = next;
        Ok(())
    }

    fn apply(&mut self, effect: Effect) -> Result<(), ErrorKind> {
        match effect {
            Effect::OpenModule(name) => {
                self.scopes.open_module(&name)?;
                self.out.module_open(&name);
            }
            Effect::OpenFunction(name) => {
                self.scopes.declare_module_function(&name)?;
                self.scopes.open_function_scope(&name);
                self.out.function_open(&name);
            }
            Effect::Punct(p) => {
                match p.as_str() {
                    "(" => self.scopes.open_bracket(),
                    ")" => self.scopes.close_bracket()?,
                    _ => {}
                }
                self.out.push(p);
            }
            Effect::Param(name) => {
                self.scopes.declare_local(&name)?;
                self.out.symbol(&name);
            }
            Effect::Assign => self.out.assign(),
            Effect::CloseFunction => {
                self.scopes.close_function_scope()?;
                self.out.function_close();
            }
            Effect::SelfRef => {
                let Some(name) = self.scopes.current_function().map(str::to_string) else {
                    return Err(ErrorKind::StructuralSyntaxError {
                        expected: "an open function".into(),
                        found: format!("«{}»", self.config.keywords.self_ref),
                    });
                };
                self.out.symbol(&name);
            }
            Effect::Number(text) => {
                let value = check_number(&text, self.config)?;
                self.out.number(value);
            }
            Effect::Text(literal) => self.out.text(&literal),
            Effect::Symbol(name) => {
                self.scopes.resolve(&name)?;
                self.out.symbol(&name);
            }
            Effect::CloseModule(entry) => {
                self.scopes.close_module(&entry)?;
                self.out.module_close(&entry);
            }
        }
        Ok(())
    }

    /// The output text; only available once every module has been closed.
    pub fn finish(self) -> CompileResult<String> {
        if self.state != State::Root {
            let err = ErrorKind::StructuralSyntaxError {
                expected: self.state.expected().into(),
                found: "end of input".into(),
            };
            return Err(err.at(self.line));
        }
        Ok(self.out.finish())
    }
}
