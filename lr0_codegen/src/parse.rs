use syn::{braced, Ident, LitStr, Result, Token};
use syn::parse::{Parse, ParseStream};

pub enum GrammarToken {
    Terminal(String),
    NonTerminal(Ident),
}

impl Parse for GrammarToken {
    fn parse(input: ParseStream) -> Result<Self> {
        let next = input.lookahead1();
        let res = if next.peek(Token![<]) {
            input.parse::<Token![<]>()?;
            let name: Ident = input.parse()?;
            input.parse::<Token![>]>()?;
            GrammarToken::NonTerminal(name)
        } else if next.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            GrammarToken::Terminal(lit.value())
        } else if next.peek(Ident) {
            let name: Ident = input.parse()?;
            GrammarToken::Terminal(name.to_string())
        } else {
            return Err(next.error());
        };
        Ok(res)
    }
}

pub struct GrammarRule(pub Vec<GrammarToken>);

impl Parse for GrammarRule {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut tokens: Vec<GrammarToken> = vec![];

        loop {
            if input.peek(Token![|]) || input.peek(Token![;]) {
                break
            }
            tokens.push(input.parse()?);
        }

        Ok(GrammarRule(tokens))
    }
}

pub struct GrammarDefinition {
    pub name: Ident,
    pub rules: Vec<GrammarRule>
}

impl Parse for GrammarDefinition {
    fn parse(input: ParseStream) -> Result<Self> {
        input.parse::<Token![<]>()?;
        let name: Ident = input.parse()?;
        input.parse::<Token![>]>()?;
        input.parse::<Token![=]>()?;

        let mut defs = vec![];
        loop {
            defs.push(input.parse::<GrammarRule>()?);

            let next = input.lookahead1();

            if next.peek(Token![;]) {
                input.parse::<Token![;]>()?;
                break
            }
            input.parse::<Token![|]>()?;
        }

        Ok(GrammarDefinition {
            name,
            rules: defs,
        })
    }
}

impl GrammarDefinition {
    fn parse_within(input: ParseStream) -> Result<Vec<Self>> {
        let mut defs = Vec::new();
        while !input.is_empty() {
            defs.push(input.parse::<GrammarDefinition>()?);
        }
        Ok(defs)
    }
}

/// `name = { <A> = ...; <B> = ...; }`, the first definition is the start symbol.
pub struct Grammar {
    pub name: Ident,
    pub defs: Vec<GrammarDefinition>,
}

impl Parse for Grammar {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let content;
        braced!(content in input);

        let defs = content.call(GrammarDefinition::parse_within)?;
        Ok(Grammar {
            name, defs
        })
    }
}

pub struct Grammars(pub Vec<Grammar>);

impl Parse for Grammars {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut defs = Vec::new();
        while !input.is_empty() {
            defs.push(input.parse::<Grammar>()?);
        }
        Ok(Grammars(defs))
    }
}
