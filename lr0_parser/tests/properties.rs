//! Property tests for table generation and parsing.

use std::collections::{HashMap, VecDeque};

use lr0_parser::parser::{Grammar, Lr0Parser, Lr0Table, ParseError, StateId, Symbol};
use proptest::prelude::*;

fn t(name: &str) -> Symbol {
    Symbol::terminal(name)
}

fn nt(name: &str) -> Symbol {
    Symbol::non_terminal(name)
}

fn example_productions() -> Vec<(Symbol, Vec<Symbol>)> {
    vec![
        (nt("S"), vec![nt("B"), t("eof")]),
        (nt("B"), vec![nt("B"), nt("A")]),
        (nt("A"), vec![t("y")]),
        (nt("B"), vec![t("x")]),
    ]
}

fn expression_productions() -> Vec<(Symbol, Vec<Symbol>)> {
    vec![
        (nt("S"), vec![nt("E"), t("$")]),
        (nt("E"), vec![nt("E"), t("+"), nt("T")]),
        (nt("E"), vec![nt("T")]),
        (nt("T"), vec![t("n")]),
        (nt("T"), vec![t("("), nt("E"), t(")")]),
    ]
}

/// Walks both tables from state 0 and checks that the same symbols lead to matching states.
fn isomorphic(a: &Lr0Table, b: &Lr0Table) -> bool {
    if a.state_count() != b.state_count() || a.start_symbol() != b.start_symbol() {
        return false;
    }
    let edges = |table: &Lr0Table| {
        let mut res: HashMap<StateId, Vec<(Symbol, StateId)>> = HashMap::new();
        for (from, symbol, to) in table.shift_edges() {
            res.entry(from).or_default().push((symbol.clone(), to));
        }
        res
    };
    let (edges_a, edges_b) = (edges(a), edges(b));

    let mut mapping: HashMap<StateId, StateId> = HashMap::new();
    mapping.insert(0, 0);
    let mut queue = VecDeque::new();
    queue.push_back((0, 0));

    while let Some((x, y)) = queue.pop_front() {
        if a.reduce_entry(x) != b.reduce_entry(y) {
            return false;
        }
        let out_a = edges_a.get(&x).cloned().unwrap_or_default();
        let out_b = edges_b.get(&y).cloned().unwrap_or_default();
        if out_a.len() != out_b.len() {
            return false;
        }
        for (symbol, to_a) in out_a {
            let to_b = match b.shift(y, &symbol) {
                Some(x) => x,
                None => return false,
            };
            match mapping.get(&to_a) {
                Some(&mapped) if mapped != to_b => return false,
                Some(_) => {},
                None => {
                    mapping.insert(to_a, to_b);
                    queue.push_back((to_a, to_b));
                },
            }
        }
    }
    mapping.len() as u32 == a.state_count()
}

fn tokens(text: &str) -> Vec<Symbol> {
    text.split_whitespace().map(t).collect()
}

fn arb_expression() -> impl Strategy<Value = String> {
    let leaf = Just("n".to_owned());
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{} + {}", a, b)),
            inner.prop_map(|a| format!("( {} )", a)),
        ]
    })
}

#[test]
fn example_from_the_grammar_description() {
    let parser = Lr0Parser::from_productions(nt("S"), example_productions()).unwrap();
    let tree = parser.parse(&tokens("x y eof")).unwrap();
    assert_eq!(tree.symbol, nt("S"));
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].symbol, nt("B"));
    assert_eq!(tree.children[1].symbol, t("eof"));
    assert!(tree.children[1].is_leaf());

    assert!(matches!(
        parser.parse(&tokens("y eof")),
        Err(ParseError::UnexpectedSymbol { .. })
    ));
}

proptest! {
    #[test]
    fn leaves_give_back_the_input(count in 0usize..20) {
        let parser = Lr0Parser::from_productions(nt("S"), example_productions()).unwrap();
        let mut input = vec![t("x")];
        input.extend(std::iter::repeat(t("y")).take(count));
        input.push(t("eof"));

        let tree = parser.parse(&input).unwrap();
        let leaves: Vec<Symbol> = tree.leaves().into_iter().cloned().collect();
        prop_assert_eq!(leaves, input);
    }

    #[test]
    fn expressions_round_trip(text in arb_expression()) {
        let parser = Lr0Parser::from_productions(nt("S"), expression_productions()).unwrap();
        let input = tokens(&format!("{} $", text));

        let tree = parser.parse(&input).unwrap();
        let leaves: Vec<&str> = tree.leaves().iter()
            .map(|x| x.name())
            .filter(|x| *x != "$")
            .collect();
        let expected: Vec<&str> = text.split_whitespace().collect();
        prop_assert_eq!(leaves, expected);
    }

    #[test]
    fn parsing_is_repeatable(text in arb_expression()) {
        let parser = Lr0Parser::from_productions(nt("S"), expression_productions()).unwrap();
        let input = tokens(&format!("{} $", text));
        prop_assert_eq!(parser.parse(&input), parser.parse(&input));
    }

    #[test]
    fn random_input_never_panics(input in prop::collection::vec(prop::sample::select(vec!["x", "y", "eof", "A", "B", "S"]), 0..12)) {
        let parser = Lr0Parser::from_productions(nt("S"), example_productions()).unwrap();
        // Upper case names are fed as non-terminals, the input can never hold those
        let symbols: Vec<Symbol> = input.iter()
            .map(|x| if x.chars().all(char::is_uppercase) { nt(x) } else { t(x) })
            .collect();

        let valid = input.len() >= 2
            && input[0] == "x"
            && input[input.len() - 1] == "eof"
            && input[1..input.len() - 1].iter().all(|x| *x == "y");
        prop_assert_eq!(parser.parse(&symbols).is_ok(), valid);
    }

    #[test]
    fn states_do_not_depend_on_rule_order(productions in Just(expression_productions()).prop_shuffle()) {
        let reference = Lr0Table::new(&Grammar::new(nt("S"), expression_productions()).unwrap());
        let shuffled = Lr0Table::new(&Grammar::new(nt("S"), productions).unwrap());
        prop_assert!(isomorphic(&reference, &shuffled));
    }
}

#[test]
fn reduce_states_never_shift() {
    for productions in vec![example_productions(), expression_productions()] {
        let table = Lr0Table::new(&Grammar::new(nt("S"), productions).unwrap());
        for (state, _) in table.reductions() {
            assert!(!table.has_shifts(state));
        }
    }
}
