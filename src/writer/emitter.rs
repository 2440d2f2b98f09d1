//! Append-only output buffer and the fragment shapes the front-ends emit.
//!
//! Fragments are concatenated exactly in the order they are pushed; the
//! emitter never reorders, merges or rewrites anything.

use crate::model::Config;

/// `<prefix><NAME>`
pub fn symbol(config: &Config, name: &str) -> String {
    format!("{}{}", config.prefix, name)
}

/// Text literals (quotes included) go through the runtime constructor.
pub fn text(config: &Config, literal: &str) -> String {
    format!("{}{}({})", config.prefix, config.text_ctor, literal)
}

pub fn select(config: &Config, cond: &str, then: &str, otherwise: &str) -> String {
    format!("{}(({cond}),({then}),({otherwise}))", config.select_fn)
}

#[derive(Debug)]
pub struct Emitter<'a> {
    config: &'a Config,
    buffer: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            buffer: Vec::new(),
        }
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.buffer.push(fragment.into());
    }

    pub fn symbol(&mut self, name: &str) {
        self.push(symbol(self.config, name));
    }

    pub fn number(&mut self, value: u32) {
        self.push(value.to_string());
    }

    pub fn text(&mut self, literal: &str) {
        self.push(text(self.config, literal));
    }

    // ── Declaration fragments ────────────────────────────────────────────

    pub fn module_open(&mut self, name: &str) {
        let name = symbol(self.config, name);
        self.push(format!("const {name} = function () {{\n"));
    }

    pub fn module_close(&mut self, entry: &str) {
        let entry = symbol(self.config, entry);
        self.push(format!("  return {entry};\n}}();\n"));
    }

    pub fn function_open(&mut self, name: &str) {
        let name = symbol(self.config, name);
        self.push(format!("  const {name} = "));
    }

    pub fn assign(&mut self) {
        self.push(" => (");
    }

    pub fn function_close(&mut self) {
        self.push(");\n");
    }

    pub fn finish(self) -> String {
        self.buffer.concat()
    }
}
