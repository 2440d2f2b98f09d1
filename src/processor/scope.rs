//! Identifier namespaces of one compilation.
//!
//! Three scopes are live at any time: global (builtins from the config plus
//! every module closed so far), module (functions of the open module) and
//! local (parameters of the open function). Only one module and one function
//! can be open; nothing nests.

use snafu::ensure;
use std::collections::HashSet;

use super::error::{
    AlreadyDefinedSnafu, AlreadyOpenSnafu, ErrorKind, StructuralSyntaxSnafu,
    TooLongIdentifierSnafu, UnbalancedParenthesisSnafu, UndefinedSymbolSnafu,
};
use crate::model::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Local,
    Module,
    Global,
}

/// Signed parenthesis depth of one function body or expression.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Brackets(i32);

impl Brackets {
    pub fn open(&mut self) {
        self.0 += 1;
    }

    /// Fails as soon as the depth would go negative.
    pub fn close(&mut self) -> Result<(), ErrorKind> {
        ensure!(
            self.0 > 0,
            UnbalancedParenthesisSnafu {
                detail: "closing parenthesis without an opening one",
            }
        );
        self.0 -= 1;
        Ok(())
    }

    pub fn ensure_closed(&self) -> Result<(), ErrorKind> {
        ensure!(
            self.0 == 0,
            UnbalancedParenthesisSnafu {
                detail: format!("{} parenthesis left open", self.0),
            }
        );
        Ok(())
    }
}

pub struct Scopes<'a> {
    config: &'a Config,
    /// Closed modules; builtins stay in `config`.
    promoted: HashSet<String>,
    module: HashSet<String>,
    locals: HashSet<String>,
    module_name: Option<String>,
    function_name: Option<String>,
    brackets: Brackets,
}

impl<'a> Scopes<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            promoted: HashSet::new(),
            module: HashSet::new(),
            locals: HashSet::new(),
            module_name: None,
            function_name: None,
            brackets: Brackets::default(),
        }
    }

    fn check_len(&self, name: &str) -> Result<(), ErrorKind> {
        ensure!(
            name.chars().count() <= self.config.max_symbol_len,
            TooLongIdentifierSnafu {
                name,
                max: self.config.max_symbol_len,
            }
        );
        Ok(())
    }

    fn is_global(&self, name: &str) -> bool {
        self.config.is_builtin(name) || self.promoted.contains(name)
    }

    fn is_taken(&self, name: &str) -> bool {
        self.config.is_reserved(name)
            || self.is_global(name)
            || self.module.contains(name)
            || self.locals.contains(name)
            || self.module_name.as_deref() == Some(name)
            || self.function_name.as_deref() == Some(name)
    }

    fn check_new(&self, name: &str) -> Result<(), ErrorKind> {
        self.check_len(name)?;
        ensure!(!self.is_taken(name), AlreadyDefinedSnafu { name });
        Ok(())
    }

    pub fn declare_global(&mut self, name: &str) -> Result<(), ErrorKind> {
        self.check_new(name)?;
        self.promoted.insert(name.to_string());
        Ok(())
    }

    pub fn declare_module_function(&mut self, name: &str) -> Result<(), ErrorKind> {
        self.check_new(name)?;
        self.module.insert(name.to_string());
        Ok(())
    }

    pub fn declare_local(&mut self, name: &str) -> Result<(), ErrorKind> {
        self.check_new(name)?;
        self.locals.insert(name.to_string());
        Ok(())
    }

    /// Local, then module, then global; the first hit wins.
    pub fn resolve(&self, name: &str) -> Result<ScopeKind, ErrorKind> {
        self.check_len(name)?;
        if self.locals.contains(name) {
            return Ok(ScopeKind::Local);
        }
        if self.module.contains(name) {
            return Ok(ScopeKind::Module);
        }
        if self.is_global(name) {
            return Ok(ScopeKind::Global);
        }
        UndefinedSymbolSnafu { name }.fail()
    }

    pub fn open_module(&mut self, name: &str) -> Result<(), ErrorKind> {
        if let Some(open) = &self.module_name {
            return AlreadyOpenSnafu { name: open.as_str() }.fail();
        }
        self.check_new(name)?;
        self.module_name = Some(name.to_string());
        Ok(())
    }

    /// Closes the open module, exporting `entry`, and promotes the module
    /// name into the global scope. Returns the module name.
    pub fn close_module(&mut self, entry: &str) -> Result<String, ErrorKind> {
        self.check_len(entry)?;
        ensure!(
            self.module.contains(entry) || self.is_global(entry),
            UndefinedSymbolSnafu { name: entry }
        );
        let Some(name) = self.module_name.take() else {
            return StructuralSyntaxSnafu {
                expected: "an open module",
                found: format!("«{entry}»"),
            }
            .fail();
        };
        self.module.clear();
        self.declare_global(&name)?;
        Ok(name)
    }

    pub fn open_function_scope(&mut self, name: &str) {
        self.locals.clear();
        self.brackets = Brackets::default();
        self.function_name = Some(name.to_string());
    }

    pub fn close_function_scope(&mut self) -> Result<(), ErrorKind> {
        self.brackets.ensure_closed()?;
        self.locals.clear();
        self.function_name = None;
        Ok(())
    }

    pub fn open_bracket(&mut self) {
        self.brackets.open();
    }

    pub fn close_bracket(&mut self) -> Result<(), ErrorKind> {
        self.brackets.close()
    }

    pub fn current_function(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_defined(res: Result<(), ErrorKind>) -> bool {
        matches!(res, Err(ErrorKind::AlreadyDefined { .. }))
    }

    #[test]
    fn test_length_limit() {
        let config = Config::default();
        let mut scopes = Scopes::new(&config);

        assert_eq!(scopes.declare_local("АБВГДЕ"), Ok(()));
        assert_eq!(
            scopes.declare_local("АБВГДЕЖ"),
            Err(ErrorKind::TooLongIdentifier {
                name: "АБВГДЕЖ".into(),
                max: 6
            })
        );
        // length is checked before anything else
        assert!(matches!(
            scopes.resolve("АБВГДЕЖ"),
            Err(ErrorKind::TooLongIdentifier { .. })
        ));
    }

    #[test]
    fn test_collisions() {
        let config = Config::default();
        let mut scopes = Scopes::new(&config);

        scopes.open_module("М").unwrap();
        assert!(is_defined(scopes.declare_module_function("СЛОЖ")));
        assert!(is_defined(scopes.declare_module_function("М")));
        assert!(is_defined(scopes.declare_module_function("ПУСТЬ")));

        scopes.declare_module_function("Ф").unwrap();
        scopes.open_function_scope("Ф");
        assert!(is_defined(scopes.declare_local("Ф")));
        scopes.declare_local("А").unwrap();
        assert!(is_defined(scopes.declare_local("А")));
    }

    #[test]
    fn test_resolution_order_and_lifetime() {
        let config = Config::default();
        let mut scopes = Scopes::new(&config);

        scopes.open_module("М").unwrap();
        scopes.declare_module_function("Ф").unwrap();
        scopes.open_function_scope("Ф");

        assert!(matches!(
            scopes.resolve("Х"),
            Err(ErrorKind::UndefinedSymbol { .. })
        ));
        scopes.declare_local("Х").unwrap();
        assert_eq!(scopes.resolve("Х"), Ok(ScopeKind::Local));
        assert_eq!(scopes.resolve("Ф"), Ok(ScopeKind::Module));
        assert_eq!(scopes.resolve("СЛОЖ"), Ok(ScopeKind::Global));

        scopes.close_function_scope().unwrap();
        assert!(scopes.resolve("Х").is_err());
        assert_eq!(scopes.current_function(), None);
    }

    #[test]
    fn test_modules_promote_and_clear() {
        let config = Config::default();
        let mut scopes = Scopes::new(&config);

        scopes.open_module("ПЕРВ").unwrap();
        assert_eq!(
            scopes.open_module("ВТОР"),
            Err(ErrorKind::AlreadyOpen {
                name: "ПЕРВ".into()
            })
        );
        scopes.declare_module_function("Ф").unwrap();
        assert!(matches!(
            scopes.close_module("НЕТ"),
            Err(ErrorKind::UndefinedSymbol { .. })
        ));
        assert_eq!(scopes.close_module("Ф"), Ok("ПЕРВ".to_string()));

        assert_eq!(scopes.resolve("ПЕРВ"), Ok(ScopeKind::Global));
        assert!(scopes.resolve("Ф").is_err());

        scopes.open_module("ВТОР").unwrap();
        assert_eq!(scopes.declare_module_function("Ф"), Ok(()));
        assert!(is_defined(scopes.declare_module_function("ПЕРВ")));
    }

    #[test]
    fn test_brackets() {
        let config = Config::default();
        let mut scopes = Scopes::new(&config);
        scopes.open_function_scope("Ф");

        scopes.open_bracket();
        assert!(matches!(
            scopes.close_function_scope(),
            Err(ErrorKind::UnbalancedParenthesis { .. })
        ));
        scopes.close_bracket().unwrap();
        assert!(matches!(
            scopes.close_bracket(),
            Err(ErrorKind::UnbalancedParenthesis { .. })
        ));
    }

    #[test]
    fn test_independent_compilations() {
        let config = Config::default();
        let mut first = Scopes::new(&config);
        first.declare_global("ОБЩ").unwrap();
        assert!(first.resolve("ОБЩ").is_ok());

        let second = Scopes::new(&config);
        assert!(second.resolve("ОБЩ").is_err());
    }
}
