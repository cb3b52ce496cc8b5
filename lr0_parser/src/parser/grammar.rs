use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::parser::GrammarError;

/// A grammar symbol, identified by its name and by whether it is a terminal.
///
/// Symbols are plain values: the scanner and the grammar build them on their own and they still
/// compare (and hash) equal when both fields match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: String,
    terminal: bool,
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol { name: name.into(), terminal: true }
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol { name: name.into(), terminal: false }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[cfg(feature = "codegen")]
    pub fn to_raw_code(&self) -> proc_macro2::TokenStream {
        use quote::quote;

        let name = &self.name;
        if self.terminal {
            quote! { ::lr0_parser::parser::Symbol::terminal(#name) }
        } else {
            quote! { ::lr0_parser::parser::Symbol::non_terminal(#name) }
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.terminal {
            write!(f, "{}", self.name)
        } else {
            write!(f, "<{}>", self.name)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Production {
    pub key: Symbol,
    pub items: Vec<Symbol>,
}

/// A production with a reading point (the "dot").
///
/// `B -> B • A` has matched the first `B` and expects an `A`. Comparison, ordering and hashing
/// look at the production content and at the dot, never at where the rule was allocated, so two
/// rules built by different closures of the same state are the same rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rule {
    production: Arc<Production>,
    dot: usize,
}

impl Rule {
    pub fn new(key: Symbol, items: Vec<Symbol>) -> Self {
        Rule {
            production: Arc::new(Production { key, items }),
            dot: 0,
        }
    }

    pub fn key(&self) -> &Symbol {
        &self.production.key
    }

    pub fn items(&self) -> &[Symbol] {
        &self.production.items
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    /// Number of right-hand symbols.
    pub fn len(&self) -> usize {
        self.production.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.production.items.is_empty()
    }

    /// The symbol right after the dot, `None` once the whole right-hand side is matched.
    pub fn active_symbol(&self) -> Option<&Symbol> {
        self.production.items.get(self.dot)
    }

    pub fn is_reducible(&self) -> bool {
        self.dot >= self.len()
    }

    /// Returns the same rule with the dot moved past the active symbol.
    pub fn advance(&self) -> Option<Rule> {
        if self.is_reducible() {
            return None
        }
        Some(Rule {
            production: Arc::clone(&self.production),
            dot: self.dot + 1,
        })
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.key())?;
        for (index, item) in self.items().iter().enumerate() {
            if index == self.dot {
                write!(f, " •")?;
            }
            write!(f, " {}", item)?;
        }
        if self.is_reducible() {
            write!(f, " •")?;
        }
        Ok(())
    }
}

/// A context free grammar: a start symbol and the list of its productions.
/// The grammar is validated on construction and never changes afterwards, so it can be shared
/// between threads and between any number of tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar {
    start: Symbol,
    rules: Vec<Rule>,
    by_key: HashMap<Symbol, Vec<usize>>,
}

impl Grammar {
    pub fn new<I>(start: Symbol, productions: I) -> Result<Self, GrammarError>
        where I: IntoIterator<Item = (Symbol, Vec<Symbol>)> {
        if start.is_terminal() {
            return Err(GrammarError::TerminalStart(start));
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::new();
        let mut by_key: HashMap<Symbol, Vec<usize>> = HashMap::new();

        for (key, items) in productions {
            let rule = Rule::new(key, items);
            if rule.key().is_terminal() {
                return Err(GrammarError::TerminalLhs(rule.to_string()));
            }
            if rule.is_empty() {
                return Err(GrammarError::EmptyProduction(rule.key().clone()));
            }
            if !seen.insert(rule.clone()) {
                log::warn!("Dropping duplicate production {}", rule);
                continue;
            }
            by_key.entry(rule.key().clone()).or_default().push(rules.len());
            rules.push(rule);
        }

        if !by_key.contains_key(&start) {
            return Err(GrammarError::UndefinedStart(start));
        }

        for rule in rules.iter() {
            let undefined = rule.items().iter()
                .find(|x| !x.is_terminal() && !by_key.contains_key(*x));
            if let Some(symbol) = undefined {
                return Err(GrammarError::UndefinedNonTerminal(symbol.clone(), rule.to_string()));
            }
        }

        let grammar = Grammar { start, rules, by_key };
        if let Some(symbol) = grammar.find_unit_cycle() {
            return Err(GrammarError::UnitCycle(symbol));
        }
        Ok(grammar)
    }

    /// Builds the grammar without any check, the productions must come from a grammar that was
    /// already validated (this is what generated code uses).
    pub fn from_raw(start: Symbol, productions: Vec<(Symbol, Vec<Symbol>)>) -> Self {
        let mut by_key: HashMap<Symbol, Vec<usize>> = HashMap::new();
        let rules: Vec<Rule> = productions.into_iter()
            .map(|(key, items)| Rule::new(key, items))
            .collect();
        for (index, rule) in rules.iter().enumerate() {
            by_key.entry(rule.key().clone()).or_default().push(index);
        }
        Grammar { start, rules, by_key }
    }

    #[cfg(feature = "codegen")]
    pub fn to_raw_code(&self) -> proc_macro2::TokenStream {
        use quote::quote;

        let start = self.start.to_raw_code();
        let productions = self.rules.iter().map(|rule| {
            let key = rule.key().to_raw_code();
            let items = rule.items().iter().map(|x| x.to_raw_code());
            quote! { (#key, vec![#(#items), *]) }
        });
        quote! {
            ::lr0_parser::parser::Grammar::from_raw(#start, vec![#(#productions), *])
        }
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every rule (with the dot at the start) whose left-hand side is `symbol`, in declaration
    /// order. Terminals and unknown symbols have none.
    pub fn rules_for<'a>(&'a self, symbol: &Symbol) -> impl Iterator<Item = &'a Rule> + 'a {
        self.by_key.get(symbol)
            .map(|x| x.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&index| &self.rules[index])
    }

    pub fn non_terminals(&self) -> BTreeSet<&Symbol> {
        self.rules.iter().map(|x| x.key()).collect()
    }

    pub fn terminals(&self) -> BTreeSet<&Symbol> {
        self.rules.iter()
            .flat_map(|x| x.items())
            .filter(|x| x.is_terminal())
            .collect()
    }

    /// Finds a non-terminal that derives itself through unit productions only (`A -> B`,
    /// `B -> A`). Without empty productions this is the only way a parse can keep reducing
    /// without consuming input.
    fn find_unit_cycle(&self) -> Option<Symbol> {
        fn visit<'a>(grammar: &'a Grammar, symbol: &'a Symbol, path: &mut Vec<&'a Symbol>, done: &mut HashSet<&'a Symbol>) -> Option<Symbol> {
            if path.contains(&symbol) {
                return Some(symbol.clone());
            }
            if !done.insert(symbol) {
                return None;
            }
            path.push(symbol);
            for rule in grammar.rules_for(symbol) {
                if let [single] = rule.items() {
                    if !single.is_terminal() {
                        if let Some(x) = visit(grammar, single, path, done) {
                            return Some(x);
                        }
                    }
                }
            }
            path.pop();
            None
        }

        let mut done = HashSet::new();
        for symbol in self.non_terminals() {
            if let Some(x) = visit(self, symbol, &mut Vec::new(), &mut done) {
                return Some(x);
            }
        }
        None
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start: {}", self.start)?;
        for rule in self.rules.iter() {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> Symbol {
        Symbol::terminal(name)
    }

    fn nt(name: &str) -> Symbol {
        Symbol::non_terminal(name)
    }

    #[test]
    fn symbol_identity() {
        assert_eq!(t("x"), Symbol::terminal(String::from("x")));
        assert_ne!(t("x"), nt("x"));

        let mut set = HashSet::new();
        set.insert(t("x"));
        assert!(set.contains(&Symbol::terminal("x")));
        assert!(!set.contains(&Symbol::non_terminal("x")));
    }

    #[test]
    fn dot_advance() {
        let rule = Rule::new(nt("B"), vec![nt("B"), nt("A")]);
        assert_eq!(rule.active_symbol(), Some(&nt("B")));
        assert!(!rule.is_reducible());

        let rule1 = rule.advance().unwrap();
        assert_eq!(rule1.dot(), 1);
        assert_eq!(rule1.active_symbol(), Some(&nt("A")));
        // Advancing creates a new rule
        assert_eq!(rule.dot(), 0);
        assert_ne!(rule, rule1);

        let rule2 = rule1.advance().unwrap();
        assert!(rule2.is_reducible());
        assert_eq!(rule2.active_symbol(), None);
        assert_eq!(rule2.advance(), None);

        assert_eq!(rule2, Rule::new(nt("B"), vec![nt("B"), nt("A")]).advance().unwrap().advance().unwrap());
        assert_eq!(rule2.to_string(), "<B> → <B> <A> •");
        assert_eq!(rule1.to_string(), "<B> → <B> • <A>");
    }

    #[test]
    fn rules_lookup() {
        let grammar = Grammar::new(nt("S"), vec![
            (nt("S"), vec![nt("B"), t("eof")]),
            (nt("B"), vec![nt("B"), nt("A")]),
            (nt("A"), vec![t("y")]),
            (nt("B"), vec![t("x")]),
        ]).unwrap();

        let b_rules: Vec<_> = grammar.rules_for(&nt("B")).map(|x| x.items().to_vec()).collect();
        assert_eq!(b_rules, vec![vec![nt("B"), nt("A")], vec![t("x")]]);
        assert_eq!(grammar.rules_for(&t("x")).count(), 0);
        assert_eq!(grammar.rules_for(&nt("Z")).count(), 0);
        assert_eq!(grammar.terminals().len(), 3);
        assert_eq!(grammar.non_terminals().len(), 3);
    }

    #[test]
    fn duplicates_are_dropped() {
        let grammar = Grammar::new(nt("S"), vec![
            (nt("S"), vec![t("x")]),
            (nt("S"), vec![t("x")]),
        ]).unwrap();
        assert_eq!(grammar.rules().len(), 1);
    }

    #[test]
    fn malformed_grammars() {
        assert_eq!(
            Grammar::new(t("S"), vec![(nt("S"), vec![t("x")])]),
            Err(GrammarError::TerminalStart(t("S")))
        );
        assert_eq!(
            Grammar::new(nt("S"), vec![(nt("A"), vec![t("x")])]),
            Err(GrammarError::UndefinedStart(nt("S")))
        );
        assert_eq!(
            Grammar::new(nt("S"), vec![(t("S"), vec![t("x")])]),
            Err(GrammarError::TerminalLhs("S → x".to_owned()))
        );
        assert_eq!(
            Grammar::new(nt("S"), vec![(nt("S"), vec![])]),
            Err(GrammarError::EmptyProduction(nt("S")))
        );
        assert_eq!(
            Grammar::new(nt("S"), vec![(nt("S"), vec![nt("A"), t("x")])]),
            Err(GrammarError::UndefinedNonTerminal(nt("A"), "<S> → <A> x".to_owned()))
        );
        assert!(matches!(
            Grammar::new(nt("S"), vec![
                (nt("S"), vec![nt("A")]),
                (nt("A"), vec![nt("S")]),
                (nt("A"), vec![t("x")]),
            ]),
            Err(GrammarError::UnitCycle(_))
        ));
    }

    #[test]
    fn left_recursion_is_not_a_cycle() {
        let grammar = Grammar::new(nt("E"), vec![
            (nt("E"), vec![nt("E"), t("+"), nt("T")]),
            (nt("E"), vec![nt("T")]),
            (nt("T"), vec![t("n")]),
        ]);
        assert!(grammar.is_ok());
    }
}
