use crate::parser::{Grammar, GrammarError, Lr0Table, ParseError, ParseNode, StateId, Symbol, TreeBuilder};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Shifted,
    /// The start state was reached with the start symbol: the whole input was reduced.
    Accept,
}

/// Runs a single parse over a shared table.
///
/// A driver owns its state stack and its tree, the table is only read. Use a new driver for
/// every input.
pub struct Driver<'t> {
    table: &'t Lr0Table,
    stack: Vec<StateId>,
    current: Option<Symbol>,
    tree: TreeBuilder,
}

impl<'t> Driver<'t> {
    pub fn new(table: &'t Lr0Table) -> Self {
        Driver {
            table,
            stack: vec![0],
            current: None,
            tree: TreeBuilder::new(),
        }
    }

    fn top_state(&self) -> StateId {
        self.stack.last().copied().unwrap_or(0)
    }

    pub fn stack(&self) -> &[StateId] {
        &self.stack
    }

    pub fn tree(&self) -> &TreeBuilder {
        &self.tree
    }

    pub fn shift(&mut self) -> Result<Step, ParseError> {
        let state = self.top_state();
        let symbol = match &self.current {
            Some(x) => x,
            None => return Err(ParseError::EmptyInput),
        };

        if state == 0 && symbol == self.table.start_symbol() {
            log::trace!("Accept");
            return Ok(Step::Accept);
        }

        let new_state = match self.table.shift(state, symbol) {
            Some(x) => x,
            None => {
                return Err(ParseError::UnexpectedSymbol {
                    symbol: symbol.clone(),
                    state,
                })
            },
        };
        log::trace!("Shift {} -> {}", symbol, new_state);

        self.stack.push(new_state);
        if symbol.is_terminal() {
            self.tree.shift(symbol.clone());
        }
        debug_assert_eq!(self.tree.depth() + 1, self.stack.len());
        Ok(Step::Shifted)
    }

    /// Applies the reduction of the top state if the current symbol triggers it, returns whether
    /// something was reduced.
    pub fn reduce(&mut self) -> Result<bool, ParseError> {
        let table = self.table;
        let state = self.top_state();
        let reduction = match &self.current {
            Some(symbol) => table.reduction(state, symbol),
            None => None,
        };
        let reduction = match reduction {
            Some(x) => x,
            None => return Ok(false),
        };
        log::trace!("Reduce {} ({}) in state {}", reduction.key, reduction.len, state);

        if reduction.len >= self.stack.len() {
            return Err(ParseError::TreeUnderflow {
                label: reduction.key.clone(),
                count: reduction.len,
            });
        }
        self.tree.reduce(reduction.key.clone(), reduction.len)?;
        self.stack.truncate(self.stack.len() - reduction.len);
        self.current = Some(reduction.key.clone());
        Ok(true)
    }

    /// Reads the next input symbol. Non-terminals only come from reductions, never from the input.
    fn read(&mut self, symbol: Symbol) -> Result<(), ParseError> {
        if !symbol.is_terminal() {
            return Err(ParseError::UnexpectedSymbol {
                symbol,
                state: self.top_state(),
            });
        }
        self.current = Some(symbol);
        Ok(())
    }

    /// Parses the whole input. Reductions are tried after every shift and take precedence over
    /// reading the next symbol.
    pub fn run<I>(mut self, input: I) -> Result<ParseNode, ParseError>
        where I: IntoIterator<Item = Symbol> {
        let mut input = input.into_iter();
        match input.next() {
            Some(x) => self.read(x)?,
            None => return Err(ParseError::EmptyInput),
        }

        loop {
            if self.shift()? == Step::Accept {
                break;
            }
            if !self.reduce()? {
                match input.next() {
                    Some(x) => self.read(x)?,
                    None => return Err(ParseError::UnexpectedEnd { state: self.top_state() }),
                }
            }
        }

        if let Some(symbol) = input.next() {
            return Err(ParseError::TrailingInput { symbol });
        }
        let state = self.top_state();
        self.tree.finish().ok_or(ParseError::UnexpectedEnd { state })
    }
}

/// A grammar with its LR(0) tables, ready to parse any number of inputs.
#[derive(Clone, Debug)]
pub struct Lr0Parser {
    grammar: Grammar,
    table: Lr0Table,
}

impl Lr0Parser {
    pub fn new(grammar: Grammar) -> Self {
        let table = Lr0Table::new(&grammar);
        Lr0Parser { grammar, table }
    }

    pub fn from_productions<I>(start: Symbol, productions: I) -> Result<Self, GrammarError>
        where I: IntoIterator<Item = (Symbol, Vec<Symbol>)> {
        Ok(Lr0Parser::new(Grammar::new(start, productions)?))
    }

    /// Uses tables that were built beforehand (for example by `lr0_grammar!`).
    pub fn from_raw(grammar: Grammar, table: Lr0Table) -> Self {
        Lr0Parser { grammar, table }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn table(&self) -> &Lr0Table {
        &self.table
    }

    pub fn parse(&self, input: &[Symbol]) -> Result<ParseNode, ParseError> {
        Driver::new(&self.table).run(input.iter().cloned())
    }
}
