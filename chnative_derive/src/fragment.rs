use proc_macro2::TokenStream;
use quote::{quote, ToTokens};

/// A fragment of generated code which is either a whole block of statements
/// (e.g. a match expression wrapped in a block, with intermediate `let`
/// bindings), or a single expression that can be embedded directly where the
/// caller needs an expression.
///
/// Having this distinction lets the field-serialization logic below build up
/// either shape and have it spliced into the right place without the caller
/// needing to know which shape came out.
pub enum Fragment {
    /// A fragment of western code that evaluates to a value.
    Expr(TokenStream),
    /// A fragment of western code that performs some operation and ends in a
    /// semicolon.
    Block(TokenStream),
}

/// Interpret a fragment as an expression, wrapping it in parens if it is a
/// block of statements so it remains a single expression where embedded.
pub struct Expr(pub Fragment);

impl ToTokens for Expr {
    fn to_tokens(&self, out: &mut TokenStream) {
        match &self.0 {
            Fragment::Expr(expr) => expr.to_tokens(out),
            Fragment::Block(block) => {
                quote!({ #block }).to_tokens(out);
            }
        }
    }
}

/// Interpret a fragment as the right-hand side of a `match` arm, wrapping it
/// in braces if it is a block so the arm remains a single expression.
pub struct Match(pub Fragment);

impl ToTokens for Match {
    fn to_tokens(&self, out: &mut TokenStream) {
        match &self.0 {
            Fragment::Expr(expr) => expr.to_tokens(out),
            Fragment::Block(block) => {
                quote!({ #block }).to_tokens(out);
            }
        }
    }
}

/// Interpret a fragment as a series of statements, unwrapping the outer
/// parens that `Expr` would otherwise need when the fragment is itself an
/// expression.
pub struct Stmts(pub Fragment);

impl ToTokens for Stmts {
    fn to_tokens(&self, out: &mut TokenStream) {
        match &self.0 {
            Fragment::Expr(expr) => expr.to_tokens(out),
            Fragment::Block(block) => block.to_tokens(out),
        }
    }
}

/// Interpret a fragment as the value half of a blanket `impl` item, not used
/// directly but kept alongside the other wrappers for symmetry with the
/// block/expr split above.
pub struct BlockValue(pub Fragment);

impl ToTokens for BlockValue {
    fn to_tokens(&self, out: &mut TokenStream) {
        match &self.0 {
            Fragment::Expr(expr) => {
                quote!({ #expr }).to_tokens(out);
            }
            Fragment::Block(block) => block.to_tokens(out),
        }
    }
}
