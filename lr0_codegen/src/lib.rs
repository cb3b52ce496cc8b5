extern crate proc_macro;

use proc_macro::TokenStream;

use lr0_parser::parser::{Lr0Table, Symbol};
use proc_macro2::Span;
use quote::{quote, quote_spanned};
use syn::{Ident, parse_macro_input};

use crate::parse::{Grammar, GrammarDefinition, Grammars, GrammarToken};

mod parse;

fn to_symbol(token: &GrammarToken) -> Symbol {
    match token {
        GrammarToken::Terminal(name) => Symbol::terminal(name.as_str()),
        GrammarToken::NonTerminal(name) => Symbol::non_terminal(name.to_string()),
    }
}

fn generate_errors(errors: Vec<(Span, String)>) -> proc_macro2::TokenStream {
    let errors = errors.into_iter().map(|(span, descr)| {
        quote_spanned! {
            span => compile_error!(#descr);
        }
    });
    quote! {
        #(#errors)*
        unimplemented!()
    }
}

/// Returns the code that builds the grammar and its table, or the `compile_error!`s to emit.
fn generate_parser_code(grammar: &Grammar) -> Result<(proc_macro2::TokenStream, proc_macro2::TokenStream), proc_macro2::TokenStream> {
    let nonterminal_names: Vec<&Ident> = grammar.defs.iter().map(|x| &x.name).collect();

    let mut errors = Vec::new();
    for def in grammar.defs.iter() {
        for rule in def.rules.iter() {
            for token in rule.0.iter() {
                if let GrammarToken::NonTerminal(name) = token {
                    if !nonterminal_names.contains(&name) {
                        errors.push((name.span(), format!("Cannot find NonTerminal {}", name)));
                    }
                }
            }
        }
    }

    let start: &GrammarDefinition = match grammar.defs.first() {
        Some(x) => x,
        None => {
            errors.push((grammar.name.span(), "Empty grammar".to_owned()));
            return Err(generate_errors(errors));
        }
    };

    if !errors.is_empty() {
        return Err(generate_errors(errors));
    }

    let productions = grammar.defs.iter().flat_map(|def| {
        def.rules.iter().map(move |rule| {
            (Symbol::non_terminal(def.name.to_string()), rule.0.iter().map(to_symbol).collect::<Vec<_>>())
        })
    });

    // The grammar is validated and the tables built now, the generated code only rebuilds them.
    match lr0_parser::parser::Grammar::new(Symbol::non_terminal(start.name.to_string()), productions) {
        Ok(real_grammar) => {
            let table = Lr0Table::new(&real_grammar);
            Ok((real_grammar.to_raw_code(), table.to_raw_code()))
        },
        Err(e) => Err(generate_errors(vec![(grammar.name.span(), e.to_string())])),
    }
}

fn generate_grammar_code(grammar: &Grammar) -> proc_macro2::TokenStream {
    let (grammar_code, table_code) = match generate_parser_code(grammar) {
        Ok(x) => x,
        Err(errors) => (errors, quote!(unimplemented!())),
    };

    let name = &grammar.name;

    quote! {
        mod #name {
            pub fn grammar() -> ::lr0_parser::parser::Grammar {
                #grammar_code
            }

            pub fn table() -> ::lr0_parser::parser::Lr0Table {
                #table_code
            }

            pub fn create_parser() -> ::lr0_parser::parser::Lr0Parser {
                ::lr0_parser::parser::Lr0Parser::from_raw(grammar(), table())
            }
        }
    }
}

/// Declares one or more grammars, each one becomes a module with `grammar()`, `table()` and
/// `create_parser()`.
///
/// ```ignore
/// lr0_grammar!(
/// lang = {
///     <S> = <B> eof;
///     <B> = <B> <A> | x;
///     <A> = y | "+";
/// }
/// );
/// ```
///
/// `<X>` is a non-terminal, identifiers and string literals are terminals.
#[proc_macro]
pub fn lr0_grammar(item: TokenStream) -> TokenStream {
    let ast: Grammars = parse_macro_input!(item as Grammars);

    let codes = ast.0.iter().map(generate_grammar_code);

    quote!(
        #(#codes)*
    ).into()
}
