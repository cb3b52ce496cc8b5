use serde::Deserialize;

use crate::parser::Symbol;

/// How the text is cut into terminals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// One terminal per character (whitespace included).
    Chars,
    /// One terminal per whitespace separated word.
    Whitespace,
}

impl Default for SplitMode {
    fn default() -> Self {
        SplitMode::Chars
    }
}

/// Turns text into a stream of terminal symbols closed by an end symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scanner {
    mode: SplitMode,
    end: Symbol,
}

impl Scanner {
    pub fn new(mode: SplitMode, end: Symbol) -> Self {
        Scanner { mode, end }
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    pub fn end_symbol(&self) -> &Symbol {
        &self.end
    }

    pub fn tokenize(&self, data: &str) -> Vec<Symbol> {
        let mut tokens: Vec<Symbol> = match self.mode {
            SplitMode::Chars => data.chars()
                .map(|x| Symbol::terminal(x.to_string()))
                .collect(),
            SplitMode::Whitespace => data.split_whitespace()
                .map(Symbol::terminal)
                .collect(),
        };
        log::trace!("Tokenized {} symbols", tokens.len());
        tokens.push(self.end.clone());
        tokens
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Symbol;
    use crate::scanner::{Scanner, SplitMode};

    #[test]
    fn chars() {
        let scanner = Scanner::new(SplitMode::Chars, Symbol::terminal("eof"));
        assert_eq!(scanner.tokenize("xy y"), [
            Symbol::terminal("x"),
            Symbol::terminal("y"),
            Symbol::terminal(" "),
            Symbol::terminal("y"),
            Symbol::terminal("eof"),
        ]);
    }

    #[test]
    fn words() {
        let scanner = Scanner::new(SplitMode::Whitespace, Symbol::terminal("$"));
        assert_eq!(scanner.tokenize("  let x\t= 1\n"), [
            Symbol::terminal("let"),
            Symbol::terminal("x"),
            Symbol::terminal("="),
            Symbol::terminal("1"),
            Symbol::terminal("$"),
        ]);
    }

    #[test]
    fn empty_text() {
        let scanner = Scanner::new(SplitMode::default(), Symbol::terminal("eof"));
        assert_eq!(scanner.mode(), SplitMode::Chars);
        assert_eq!(scanner.tokenize(""), [scanner.end_symbol().clone()]);
        assert_eq!(scanner.end_symbol(), &Symbol::terminal("eof"));
    }

    #[test]
    fn mode_from_config() {
        let mode: SplitMode = serde_json::from_str("\"whitespace\"").unwrap();
        assert_eq!(mode, SplitMode::Whitespace);
    }
}
