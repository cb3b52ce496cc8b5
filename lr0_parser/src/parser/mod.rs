mod driver;
mod error;
mod grammar;
mod lr0_table;
mod tree;

pub use {
    grammar::Grammar, grammar::Production, grammar::Rule, grammar::Symbol,
    lr0_table::Lr0Table, lr0_table::Lr0Automaton, lr0_table::Reduction, lr0_table::State,
    lr0_table::StateId,
    tree::ParseNode, tree::TreeBuilder,
    driver::Driver, driver::Lr0Parser, driver::Step,
    error::GrammarError, error::ParseError,
};
