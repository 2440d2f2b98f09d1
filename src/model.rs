// default vocabulary of the language and the runtime library it targets
pub const MODULE_KEYWORD: &str = "МОДУЛЬ";
pub const FUNCTION_KEYWORD: &str = "ПУСТЬ";
pub const START_KEYWORD: &str = "СТАРТ";
pub const SELF_KEYWORD: &str = "СЕБЯ";

pub const BUILTIN_GLOBALS: &[&str] = &[
    "СЛОЖ", "ИНВ", "ОТР", "НЕИ", "СПИСОК", "ГОЛОВА", "ХВОСТ", "ПУСТО", "ВЫБОР", "ВЫВОД", "ВЫВОДС",
];

/// Keywords of the expression sub-language handled by the folder.
pub const EXPRESSION_KEYWORDS: &[&str] = &["LET", "RUN", "IF", "THEN", "ELSE"];

/// Single-character operators, in scan priority order.
pub const PUNCTUATION: &[char] = &['=', '(', ')', ',', '+', '-'];

pub const MAX_SYMBOL_LEN: usize = 6;
pub const NUMBER_MIN: u32 = 0;
pub const NUMBER_MAX: u32 = 1000;

use serde::Deserialize;

/// Declaration keywords driving the module/function translator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Keywords {
    pub module: String,
    pub function: String,
    pub start: String,
    pub self_ref: String,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            module: MODULE_KEYWORD.into(),
            function: FUNCTION_KEYWORD.into(),
            start: START_KEYWORD.into(),
            self_ref: SELF_KEYWORD.into(),
        }
    }
}

impl Keywords {
    pub fn all(&self) -> [&str; 4] {
        [
            self.module.as_str(),
            self.function.as_str(),
            self.start.as_str(),
            self.self_ref.as_str(),
        ]
    }
}

/// Inclusive bounds for numeric literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NumberRange {
    pub min: u32,
    pub max: u32,
}

impl Default for NumberRange {
    fn default() -> Self {
        Self {
            min: NUMBER_MIN,
            max: NUMBER_MAX,
        }
    }
}

impl NumberRange {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Everything a compilation needs to know about the language it reads and
/// the code it writes.
///
/// A `Config` is never mutated by a compilation; every scanner, scope
/// manager and emitter borrows it, so one value can serve any number of
/// independent compilations.
///
/// Keyword and builtin names are compared against upper-cased source
/// words, so a `Config` built in code must spell them in upper case.
/// `config::normalize` puts any hand-built value into that form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keywords: Keywords,
    pub globals: Vec<String>,
    pub max_symbol_len: usize,
    pub number_range: NumberRange,
    /// Prepended to every emitted symbol (`m_` → `m_СЛОЖ`).
    pub prefix: String,
    /// Runtime function wrapping text literals.
    pub text_ctor: String,
    /// Runtime function emitted for `IF … THEN … ELSE`.
    pub select_fn: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: Keywords::default(),
            globals: BUILTIN_GLOBALS.iter().map(|g| g.to_string()).collect(),
            max_symbol_len: MAX_SYMBOL_LEN,
            number_range: NumberRange::default(),
            prefix: "m_".into(),
            text_ctor: "ТЕКСТ".into(),
            select_fn: "select".into(),
        }
    }
}

impl Config {
    /// Every word the scanner must classify as an operator/keyword.
    pub fn reserved_words(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .all()
            .into_iter()
            .chain(EXPRESSION_KEYWORDS.iter().copied())
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_words().any(|k| k == word)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.globals.iter().any(|g| g == name)
    }
}

/// Which front-end the CLI should drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Whole programs made of module declarations.
    #[default]
    Module,
    /// A single unparenthesized expression.
    Expression,
}
