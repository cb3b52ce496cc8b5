use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

use crate::parser::{Grammar, Rule, Symbol};

pub type StateId = u32;

/// A state of the LR(0) automaton: every rule position reachable without reading more input.
/// The rules are kept in a `BTreeSet` so that two states with the same rules are equal and hash
/// the same, whatever order the rules were found in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct State(BTreeSet<Rule>);

impl State {
    pub fn rules(&self) -> std::collections::btree_set::Iter<Rule> {
        self.0.iter()
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.0.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first fully matched rule (in rule order), if any.
    pub fn reducible_rule(&self) -> Option<&Rule> {
        self.0.iter().find(|x| x.is_reducible())
    }

    /// Distinct symbols found right after a dot, in symbol order.
    pub fn active_symbols(&self) -> BTreeSet<&Symbol> {
        self.0.iter().filter_map(|x| x.active_symbol()).collect()
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for rule in self.0.iter() {
            writeln!(f, "  {}", rule)?;
        }
        Ok(())
    }
}

/// What a reducible state does once it is reached through `trigger`: pop `len` states and
/// replace them with `key`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reduction {
    pub trigger: Symbol,
    pub key: Symbol,
    pub len: usize,
}

/// Sparse shift and reduce tables of an LR(0) automaton.
///
/// The tables are never modified after construction, a single table can serve any number of
/// parses (even from different threads).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lr0Table {
    start: Symbol,
    state_count: u32,
    shift_table: HashMap<StateId, HashMap<Symbol, StateId>>,
    reduce_table: HashMap<StateId, Reduction>,
}

impl Lr0Table {
    pub fn new(grammar: &Grammar) -> Self {
        Lr0Automaton::build(grammar).table
    }

    pub fn from_raw(
        start: Symbol,
        state_count: u32,
        shifts: Vec<(StateId, Symbol, StateId)>,
        reductions: Vec<(StateId, Reduction)>,
    ) -> Self {
        let mut shift_table: HashMap<StateId, HashMap<Symbol, StateId>> = HashMap::new();
        for (from, symbol, to) in shifts {
            shift_table.entry(from).or_default().insert(symbol, to);
        }
        Lr0Table {
            start,
            state_count,
            shift_table,
            reduce_table: reductions.into_iter().collect(),
        }
    }

    #[cfg(feature = "codegen")]
    pub fn to_raw_code(&self) -> proc_macro2::TokenStream {
        use quote::quote;

        let start = self.start.to_raw_code();
        let state_count = self.state_count;

        let shifts = self.shift_edges().into_iter().map(|(from, symbol, to)| {
            let symbol = symbol.to_raw_code();
            quote! { (#from, #symbol, #to) }
        });

        let reductions = self.reductions().into_iter().map(|(state, reduction)| {
            let trigger = reduction.trigger.to_raw_code();
            let key = reduction.key.to_raw_code();
            let len = reduction.len;
            quote! {
                (#state, ::lr0_parser::parser::Reduction { trigger: #trigger, key: #key, len: #len })
            }
        });

        quote! {
            ::lr0_parser::parser::Lr0Table::from_raw(
                #start,
                #state_count,
                vec![#(#shifts), *],
                vec![#(#reductions), *]
            )
        }
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.start
    }

    pub fn state_count(&self) -> u32 {
        self.state_count
    }

    pub fn shift(&self, state: StateId, symbol: &Symbol) -> Option<StateId> {
        self.shift_table.get(&state)
            .and_then(|x| x.get(symbol))
            .copied()
    }

    /// The reduction to apply in `state` when `symbol` was the last symbol shifted into it.
    pub fn reduction(&self, state: StateId, symbol: &Symbol) -> Option<&Reduction> {
        self.reduce_table.get(&state)
            .filter(|x| x.trigger == *symbol)
    }

    pub fn reduce_entry(&self, state: StateId) -> Option<&Reduction> {
        self.reduce_table.get(&state)
    }

    pub fn has_shifts(&self, state: StateId) -> bool {
        self.shift_table.get(&state).map_or(false, |x| !x.is_empty())
    }

    /// Every shift transition, sorted by origin state then symbol.
    pub fn shift_edges(&self) -> Vec<(StateId, &Symbol, StateId)> {
        let mut res: Vec<_> = self.shift_table.iter()
            .flat_map(|(from, row)| row.iter().map(move |(symbol, to)| (*from, symbol, *to)))
            .collect();
        res.sort();
        res
    }

    /// Every reduce entry, sorted by state.
    pub fn reductions(&self) -> Vec<(StateId, &Reduction)> {
        let mut res: Vec<_> = self.reduce_table.iter()
            .map(|(state, reduction)| (*state, reduction))
            .collect();
        res.sort_by_key(|x| x.0);
        res
    }
}

impl Display for Lr0Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start: {}", self.start)?;
        writeln!(f, "States: {}", self.state_count)?;
        writeln!(f, "Shift:")?;
        for (from, symbol, to) in self.shift_edges() {
            writeln!(f, "{:<3} {:10} -> {}", from, symbol.to_string(), to)?;
        }
        writeln!(f, "Reduce:")?;
        for (state, reduction) in self.reductions() {
            writeln!(f, "{:<3} {:10} => {} ({})", state, reduction.trigger.to_string(), reduction.key, reduction.len)?;
        }
        Ok(())
    }
}

/// The canonical collection of LR(0) states together with the tables built from it.
/// `states[id]` is the rule set of state `id`.
#[derive(Clone, Debug)]
pub struct Lr0Automaton {
    pub states: Vec<State>,
    pub table: Lr0Table,
}

impl Lr0Automaton {
    pub fn build(grammar: &Grammar) -> Self {
        let mut data = DfaBuildData {
            grammar,
            state_to_index: HashMap::new(),
            states: Vec::new(),
            shift_table: HashMap::new(),
            reduce_table: HashMap::new(),
        };
        data.build_dfa();
        log::debug!("LR(0) automaton built: {} states", data.states.len());

        let table = Lr0Table {
            start: grammar.start().clone(),
            state_count: data.states.len() as u32,
            shift_table: data.shift_table,
            reduce_table: data.reduce_table,
        };
        Lr0Automaton {
            states: data.states,
            table,
        }
    }
}

impl Display for Lr0Automaton {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            writeln!(f, "State {}", id)?;
            write!(f, "{}", state)?;
        }
        write!(f, "{}", self.table)
    }
}

struct DfaBuildData<'a> {
    grammar: &'a Grammar,
    state_to_index: HashMap<State, StateId>,
    states: Vec<State>,
    shift_table: HashMap<StateId, HashMap<Symbol, StateId>>,
    reduce_table: HashMap<StateId, Reduction>,
}

impl<'a> DfaBuildData<'a> {
    /// Adds to `into` every rule that `symbol` can start with, dot at position 0.
    /// `path` holds the symbols being expanded by the callers, a symbol on it has its rules
    /// added already and is not expanded again (this is what stops left recursion).
    fn symbol_closure<'s>(&'s self, symbol: &'s Symbol, path: &mut Vec<&'s Symbol>, into: &mut BTreeSet<Rule>) {
        if symbol.is_terminal() {
            return;
        }
        path.push(symbol);
        for rule in self.grammar.rules_for(symbol) {
            into.insert(rule.clone());
            if let Some(first) = rule.items().first() {
                if !path.contains(&first) {
                    self.symbol_closure(first, path, into);
                }
            }
        }
        path.pop();
    }

    /// Closes a set of rules: adds the closure of every active non-terminal.
    fn closure(&self, kernel: BTreeSet<Rule>) -> State {
        let mut rules = kernel.clone();
        for rule in kernel.iter() {
            if let Some(symbol) = rule.active_symbol() {
                self.symbol_closure(symbol, &mut Vec::new(), &mut rules);
            }
        }
        State(rules)
    }

    /// The state reached from `from` after reading `symbol`, empty when `from` cannot read it.
    fn goto(&self, from: &State, symbol: &Symbol) -> State {
        let kernel: BTreeSet<Rule> = from.rules()
            .filter(|x| x.active_symbol() == Some(symbol))
            .filter_map(|x| x.advance())
            .collect();
        self.closure(kernel)
    }

    fn create_state(&mut self, set: State, trigger: Option<&Symbol>) -> StateId {
        let new_id = self.states.len() as StateId;
        log::debug!("State {} discovered", new_id);

        if let (Some(trigger), Some(rule)) = (trigger, set.reducible_rule()) {
            // Reduce always wins: the state is not explored for shifts.
            if set.rules().filter(|x| x.is_reducible()).count() > 1 {
                log::warn!("State {} can reduce more than one rule, choosing {}", new_id, rule);
            }
            if set.rules().any(|x| !x.is_reducible()) {
                log::debug!("State {} could also shift, reducing {} instead", new_id, rule);
            }
            self.reduce_table.insert(new_id, Reduction {
                trigger: trigger.clone(),
                key: rule.key().clone(),
                len: rule.len(),
            });
        }

        self.state_to_index.insert(set.clone(), new_id);
        self.states.push(set);
        new_id
    }

    fn build_dfa(&mut self) {
        self.states.clear();
        self.state_to_index.clear();

        let mut root_set = BTreeSet::new();
        self.symbol_closure(self.grammar.start(), &mut Vec::new(), &mut root_set);
        self.create_state(State(root_set), None);

        // States are explored in discovery order, every state is registered (and so has its id)
        // before any of its transitions is computed.
        let mut next_index = 0usize;
        while next_index < self.states.len() {
            let from = next_index as StateId;
            next_index += 1;

            if self.reduce_table.contains_key(&from) {
                continue;
            }

            let transitions: Vec<(Symbol, State)> = {
                let state = &self.states[from as usize];
                state.active_symbols().into_iter()
                    .map(|symbol| (symbol.clone(), self.goto(state, symbol)))
                    .collect()
            };

            for (symbol, new_state) in transitions {
                if new_state.is_empty() {
                    continue;
                }
                let to = match self.state_to_index.get(&new_state) {
                    Some(x) => *x,
                    None => self.create_state(new_state, Some(&symbol)),
                };
                log::trace!("{} + {} = {}", from, symbol, to);
                self.shift_table.entry(from).or_default().insert(symbol, to);
            }
        }
    }
}
