use thiserror::Error;

use crate::parser::{StateId, Symbol};

/// The grammar cannot be turned into a parse table.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("start symbol {0} is a terminal")]
    TerminalStart(Symbol),
    #[error("start symbol {0} has no production")]
    UndefinedStart(Symbol),
    #[error("production {0} has a terminal on its left-hand side")]
    TerminalLhs(String),
    #[error("production of {0} has an empty right-hand side")]
    EmptyProduction(Symbol),
    #[error("non-terminal {0} used in {1} has no production")]
    UndefinedNonTerminal(Symbol, String),
    #[error("non-terminal {0} derives itself through unit productions")]
    UnitCycle(Symbol),
}

/// Errors raised while parsing a symbol stream.
/// Nothing here touches the shared tables, another parse can always be started.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected symbol {symbol} in state {state}")]
    UnexpectedSymbol { symbol: Symbol, state: StateId },
    #[error("input ended in state {state} before the start symbol was reduced")]
    UnexpectedEnd { state: StateId },
    #[error("unexpected {symbol} after the end of the parse")]
    TrailingInput { symbol: Symbol },
    #[error("empty input")]
    EmptyInput,
    #[error("cannot reduce {count} nodes into {label}: not enough nodes")]
    TreeUnderflow { label: Symbol, count: usize },
}
