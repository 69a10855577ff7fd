//! The surface syntax: an S-expression tokenizer/parser plus the schema
//! builder that recognises `defmodule`/`defcolumns`/`defconstraint`/
//! `defpermutation`/`definrange`/`defproperty`/`defpurefun` forms and
//! produces a [`HirSchema`]. Column references may be `module.name`
//! qualified or unqualified, resolved against whichever module the most
//! recent `defmodule` switched to (module 0, unnamed, before the first one).
//!
//! A single-character lookahead that skips whitespace and comments before
//! testing for punctuation is what lets a `;`-comment immediately before a
//! closing `)` parse correctly.

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap as HashMap, format, string::String, vec, vec::Vec};
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::air::Domain;
use crate::context::Context;
use crate::field::Field;
use crate::hir::HirExpr;
use crate::hir::HirSchema;
use crate::mir::ColumnType;
use core::fmt;

/// An error from tokenising or parsing, carrying the 1-indexed line/column
/// of the offending token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self { line, col, message: message.into() }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// A parsed S-expression: either an atomic symbol or a parenthesised list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SExp {
    Symbol(String),
    List(Vec<SExp>),
}

impl SExp {
    fn as_symbol(&self) -> Option<&str> {
        match self {
            SExp::Symbol(s) => Some(s.as_str()),
            SExp::List(_) => None,
        }
    }

    fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items.as_slice()),
            SExp::Symbol(_) => None,
        }
    }
}

/// A single-character-lookahead tokenizer over the source text, tracking
/// line and column for error reporting.
struct Lexer<'a> {
    text: &'a str,
    byte_pos: usize,
    line: usize,
    col: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Symbol(&'a str),
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, byte_pos: 0, line: 1, col: 1 }
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.byte_pos..]
    }

    fn advance_one(&mut self) -> Option<char> {
        let mut chars = self.remaining().chars();
        let c = chars.next()?;
        self.byte_pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Position of the next non-whitespace, non-comment character, as
    /// `(line, col)`. Used to stamp errors at the token that actually
    /// triggered them.
    fn peek_pos(&self) -> (usize, usize) {
        let mut probe = Lexer { text: self.text, byte_pos: self.byte_pos, line: self.line, col: self.col };
        probe.skip_trivia();
        (probe.line, probe.col)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.remaining().chars().next() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance_one();
                }
                Some(';') => {
                    while let Some(c) = self.remaining().chars().next() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_one();
                    }
                }
                _ => return,
            }
        }
    }

    /// Extract the next token, skipping whitespace and comments first.
    fn next(&mut self) -> Option<Token<'a>> {
        self.skip_trivia();
        let rest = self.remaining();
        let c = rest.chars().next()?;
        match c {
            '(' => {
                self.advance_one();
                Some(Token::Open)
            }
            ')' => {
                self.advance_one();
                Some(Token::Close)
            }
            _ => {
                let start = self.byte_pos;
                while let Some(c) = self.remaining().chars().next() {
                    if c == ')' || c == '(' || c.is_whitespace() {
                        break;
                    }
                    self.advance_one();
                }
                Some(Token::Symbol(&self.text[start..self.byte_pos]))
            }
        }
    }

    /// Look at what punctuation (if any) comes next, skipping whitespace and
    /// comments without consuming the token itself.
    fn lookahead_is_close(&self) -> bool {
        let mut probe = Lexer { text: self.text, byte_pos: self.byte_pos, line: self.line, col: self.col };
        probe.skip_trivia();
        matches!(probe.remaining().chars().next(), Some(')'))
    }

    fn at_eof(&self) -> bool {
        let mut probe = Lexer { text: self.text, byte_pos: self.byte_pos, line: self.line, col: self.col };
        probe.skip_trivia();
        probe.remaining().is_empty()
    }
}

/// Parse the entirety of `src` into zero or more top-level S-expressions.
pub fn parse(src: &str) -> Result<Vec<SExp>, ParseError> {
    let mut lexer = Lexer::new(src);
    let mut forms = Vec::new();
    while !lexer.at_eof() {
        forms.push(parse_one(&mut lexer)?);
    }
    Ok(forms)
}

fn parse_one(lexer: &mut Lexer) -> Result<SExp, ParseError> {
    let (line, col) = lexer.peek_pos();
    match lexer.next() {
        None => Err(ParseError::new(line, col, "unexpected end of input")),
        Some(Token::Close) => Err(ParseError::new(line, col, "unexpected end-of-list")),
        Some(Token::Open) => {
            let mut elements = Vec::new();
            while !lexer.lookahead_is_close() {
                if lexer.at_eof() {
                    return Err(ParseError::new(line, col, "unterminated list"));
                }
                elements.push(parse_one(lexer)?);
            }
            lexer.next(); // consume ')'
            Ok(SExp::List(elements))
        }
        Some(Token::Symbol(s)) => Ok(SExp::Symbol(s.into())),
    }
}

// --- Schema building -------------------------------------------------------

struct Builder<F: Field> {
    schema: HirSchema<F>,
    /// Keyed by fully qualified name: `name` for the default (module 0, no
    /// `defmodule` seen yet) module, `module.name` otherwise.
    columns_by_name: HashMap<String, usize>,
    modules_by_name: HashMap<String, usize>,
    current_module: usize,
    current_module_name: Option<String>,
    next_module_id: usize,
}

impl<F: Field> Builder<F> {
    fn new() -> Self {
        Self {
            schema: HirSchema::new(),
            columns_by_name: HashMap::new(),
            modules_by_name: HashMap::new(),
            current_module: 0,
            current_module_name: None,
            next_module_id: 1,
        }
    }

    /// Qualify an unqualified column name with the current module, matching
    /// how it would have been declared (`declare_column`'s `qualified`).
    fn qualify(&self, name: &str) -> String {
        match &self.current_module_name {
            Some(module) => format!("{module}.{name}"),
            None => name.into(),
        }
    }

    /// Resolve a column reference, qualified (`module.name`) or unqualified
    /// (resolved against the current module).
    fn resolve_column(&self, name: &str) -> Option<usize> {
        if name.contains('.') {
            return self.columns_by_name.get(name).copied();
        }
        self.columns_by_name.get(&self.qualify(name)).copied()
    }

    fn declare_column(&mut self, name: &str, ty: ColumnType) -> usize {
        let qualified = self.qualify(name);
        if let Some(&id) = self.columns_by_name.get(&qualified) {
            return id;
        }
        let id = self
            .schema
            .add_column(qualified.clone(), ty, Context::new(self.current_module, 1))
            .expect("names are checked against columns_by_name before declaring");
        self.columns_by_name.insert(qualified, id);
        id
    }

    /// `(defmodule name)`: switch the module subsequent `defcolumns` target
    /// and unqualified column references resolve against. Re-entering a
    /// previously seen module reuses its id rather than minting a new one.
    fn process_defmodule(&mut self, args: &[SExp]) -> Result<(), ParseError> {
        let [name] = args else {
            return Err(err("`defmodule` takes exactly 1 argument"));
        };
        let name = name.as_symbol().ok_or_else(|| err("module name must be a symbol"))?;
        let id = if let Some(&id) = self.modules_by_name.get(name) {
            id
        } else {
            let id = self.next_module_id;
            self.next_module_id += 1;
            self.modules_by_name.insert(name.into(), id);
            id
        };
        self.current_module = id;
        self.current_module_name = Some(name.into());
        Ok(())
    }
}

fn err(message: impl Into<String>) -> ParseError {
    ParseError::new(0, 0, message)
}

/// Parse a decimal or `0x`-prefixed hex integer literal into a field
/// element.
fn parse_integer_literal<F: Field>(token: &str) -> Option<F> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok().map(F::from_u64)
    } else {
        token.parse::<u64>().ok().map(F::from_u64)
    }
}

/// Parse a bare integer literal (decimal or `0x`-prefixed hex) as a raw
/// `u64`, for contexts like `definrange`'s bound that aren't field elements.
fn parse_bound_literal(token: &str) -> Option<u64> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        token.parse::<u64>().ok()
    }
}

/// Parse a column type tag like `:u8` into `Uint(8)`.
fn parse_type_tag(token: &str) -> Result<ColumnType, ParseError> {
    let digits = token.strip_prefix(":u").ok_or_else(|| err(format!("unrecognised type tag `{token}`")))?;
    let bits: u32 = digits.parse().map_err(|_| err(format!("invalid bit width in type tag `{token}`")))?;
    Ok(ColumnType::Uint(bits))
}

fn parse_domain(sexp: &SExp) -> Result<Domain, ParseError> {
    match sexp {
        SExp::Symbol(s) if s == "nil" => Ok(Domain::All),
        SExp::Symbol(s) if s == ":first" => Ok(Domain::Row(0)),
        SExp::Symbol(s) if s == ":last" => Ok(Domain::Row(-1)),
        SExp::Symbol(s) => {
            let n: i64 = s.parse().map_err(|_| err(format!("invalid domain `{s}`")))?;
            Ok(Domain::Row(n))
        }
        SExp::List(_) => Err(err("domain must be an atom")),
    }
}

fn parse_sign(sexp: &SExp) -> Result<bool, ParseError> {
    match sexp.as_symbol() {
        Some("+") => Ok(true),
        Some("-") => Ok(false),
        _ => Err(err("permutation sign must be `+` or `-`")),
    }
}

impl<F: Field> Builder<F> {
    /// Parse an expression body. `allow_list` is true only at a constraint's
    /// root, matching the rule that `List` (spelled `begin` in source) is
    /// illegal anywhere else.
    fn parse_expr(&mut self, sexp: &SExp, allow_list: bool) -> Result<HirExpr<F>, ParseError> {
        match sexp {
            SExp::Symbol(s) => {
                if let Some(value) = parse_integer_literal::<F>(s) {
                    return Ok(HirExpr::constant(value));
                }
                let id = self
                    .resolve_column(s)
                    .ok_or_else(|| err(format!("unknown column `{s}`")))?;
                Ok(HirExpr::column(id, 0))
            }
            SExp::List(items) => self.parse_form(items, allow_list),
        }
    }

    fn parse_form(&mut self, items: &[SExp], allow_list: bool) -> Result<HirExpr<F>, ParseError> {
        let (head, args) = items.split_first().ok_or_else(|| err("empty expression list"))?;
        let op = head.as_symbol().ok_or_else(|| err("expression head must be a symbol"))?;

        match op {
            "+" => self.parse_nary(args, HirExpr::add),
            "*" => self.parse_nary(args, HirExpr::mul),
            "-" => self.parse_sub(args),
            "^" => self.parse_pow(args),
            "norm" => {
                let inner = self.expect_one(args)?;
                Ok(HirExpr::normalise(self.parse_expr(inner, false)?))
            }
            "shift" => self.parse_shift(args),
            "if" | "if-zero" => self.parse_if_zero(args),
            "if-not-zero" => self.parse_if_not_zero(args),
            "begin" => {
                if !allow_list {
                    return Err(err("`begin` (List) is only legal at a constraint's root"));
                }
                let mut parsed = Vec::with_capacity(args.len());
                for a in args {
                    parsed.push(self.parse_expr(a, false)?);
                }
                Ok(HirExpr::list(parsed))
            }
            other => Err(err(format!("unknown operator `{other}`"))),
        }
    }

    fn parse_nary(&mut self, args: &[SExp], ctor: fn(Vec<HirExpr<F>>) -> HirExpr<F>) -> Result<HirExpr<F>, ParseError> {
        if args.len() < 2 {
            return Err(err("expected at least 2 arguments"));
        }
        let mut parsed = Vec::with_capacity(args.len());
        for a in args {
            parsed.push(self.parse_expr(a, false)?);
        }
        Ok(ctor(parsed))
    }

    fn parse_sub(&mut self, args: &[SExp]) -> Result<HirExpr<F>, ParseError> {
        match args.len() {
            0 => Err(err("`-` requires at least 1 argument")),
            1 => {
                let e = self.parse_expr(&args[0], false)?;
                Ok(HirExpr::sub(HirExpr::constant(F::ZERO), e))
            }
            _ => {
                let mut iter = args.iter();
                let mut acc = self.parse_expr(iter.next().unwrap(), false)?;
                for a in iter {
                    acc = HirExpr::sub(acc, self.parse_expr(a, false)?);
                }
                Ok(acc)
            }
        }
    }

    fn parse_pow(&mut self, args: &[SExp]) -> Result<HirExpr<F>, ParseError> {
        if args.len() != 2 {
            return Err(err("`^` takes exactly 2 arguments"));
        }
        let base = self.parse_expr(&args[0], false)?;
        let exponent_token = args[1].as_symbol().ok_or_else(|| err("`^` exponent must be an integer literal"))?;
        let exponent: u32 = exponent_token.parse().map_err(|_| err(format!("invalid exponent `{exponent_token}`")))?;
        match exponent {
            0 => Ok(HirExpr::constant(F::ONE)),
            1 => Ok(base),
            n => {
                let mut factors = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    factors.push(base.clone());
                }
                Ok(HirExpr::mul(factors))
            }
        }
    }

    fn parse_shift(&mut self, args: &[SExp]) -> Result<HirExpr<F>, ParseError> {
        if args.len() != 2 {
            return Err(err("`shift` takes exactly 2 arguments"));
        }
        let name = args[0].as_symbol().ok_or_else(|| err("`shift` target must be a column name"))?;
        let id = self.resolve_column(name).ok_or_else(|| err(format!("unknown column `{name}`")))?;
        let amount_token = args[1].as_symbol().ok_or_else(|| err("`shift` amount must be an integer literal"))?;
        let amount: i32 = amount_token.parse().map_err(|_| err(format!("invalid shift amount `{amount_token}`")))?;
        Ok(HirExpr::column(id, amount))
    }

    fn parse_if_zero(&mut self, args: &[SExp]) -> Result<HirExpr<F>, ParseError> {
        match args.len() {
            2 => {
                let cond = self.parse_expr(&args[0], false)?;
                let then_branch = self.parse_expr(&args[1], false)?;
                Ok(HirExpr::if_zero(cond, Some(then_branch), None))
            }
            3 => {
                let cond = self.parse_expr(&args[0], false)?;
                let then_branch = self.parse_expr(&args[1], false)?;
                let else_branch = self.parse_expr(&args[2], false)?;
                Ok(HirExpr::if_zero(cond, Some(then_branch), Some(else_branch)))
            }
            _ => Err(err("`if-zero` takes 2 or 3 arguments")),
        }
    }

    fn parse_if_not_zero(&mut self, args: &[SExp]) -> Result<HirExpr<F>, ParseError> {
        match args.len() {
            2 => {
                let cond = self.parse_expr(&args[0], false)?;
                let then_branch = self.parse_expr(&args[1], false)?;
                Ok(HirExpr::if_zero(cond, None, Some(then_branch)))
            }
            3 => {
                let cond = self.parse_expr(&args[0], false)?;
                let then_branch = self.parse_expr(&args[1], false)?;
                let else_branch = self.parse_expr(&args[2], false)?;
                Ok(HirExpr::if_zero(cond, Some(else_branch), Some(then_branch)))
            }
            _ => Err(err("`if-not-zero` takes 2 or 3 arguments")),
        }
    }

    fn expect_one<'s>(&self, args: &'s [SExp]) -> Result<&'s SExp, ParseError> {
        match args {
            [one] => Ok(one),
            _ => Err(err("expected exactly 1 argument")),
        }
    }

    fn process_top_level_form(&mut self, items: &[SExp]) -> Result<(), ParseError> {
        let (head, args) = items.split_first().ok_or_else(|| err("empty top-level form"))?;
        let op = head.as_symbol().ok_or_else(|| err("top-level form head must be a symbol"))?;

        match op {
            "defmodule" => self.process_defmodule(args),
            "defcolumns" => self.process_defcolumns(args),
            "defconstraint" => self.process_defconstraint(args),
            "defpermutation" => self.process_defpermutation(args),
            "definrange" => self.process_definrange(args),
            "defproperty" => self.process_defproperty(args),
            "defpurefun" => Ok(()), // inlined at call sites; nothing to register globally
            other => Err(err(format!("unknown top-level form `{other}`"))),
        }
    }

    fn process_defcolumns(&mut self, args: &[SExp]) -> Result<(), ParseError> {
        for decl in args {
            match decl {
                SExp::Symbol(name) => {
                    self.declare_column(name, ColumnType::Untyped);
                }
                SExp::List(parts) => match parts {
                    [SExp::Symbol(name), SExp::Symbol(tag)] => {
                        let ty = parse_type_tag(tag)?;
                        self.declare_column(name, ty);
                    }
                    _ => return Err(err("malformed column declaration")),
                },
            }
        }
        Ok(())
    }

    fn process_defconstraint(&mut self, args: &[SExp]) -> Result<(), ParseError> {
        let [name, domain, body] = args else {
            return Err(err("`defconstraint` takes exactly 3 arguments"));
        };
        let handle = name.as_symbol().ok_or_else(|| err("constraint name must be a symbol"))?;
        let domain = parse_domain(domain)?;
        let expr = self.parse_expr(body, true)?;
        self.schema.add_vanishing_constraint(handle, domain, Context::new(0, 1), expr);
        Ok(())
    }

    fn process_defproperty(&mut self, args: &[SExp]) -> Result<(), ParseError> {
        let [name, domain, body] = args else {
            return Err(err("`defproperty` takes exactly 3 arguments"));
        };
        let handle = name.as_symbol().ok_or_else(|| err("property name must be a symbol"))?;
        let domain = parse_domain(domain)?;
        let expr = self.parse_expr(body, true)?;
        self.schema.add_property_assertion(handle, domain, Context::new(0, 1), expr);
        Ok(())
    }

    fn process_definrange(&mut self, args: &[SExp]) -> Result<(), ParseError> {
        let [column, bound] = args else {
            return Err(err("`definrange` takes exactly 2 arguments"));
        };
        let name = column.as_symbol().ok_or_else(|| err("`definrange` target must be a column name"))?;
        let id = self.resolve_column(name).ok_or_else(|| err(format!("unknown column `{name}`")))?;
        let bound_token = bound.as_symbol().ok_or_else(|| err("`definrange` bound must be an integer literal"))?;
        let bound = parse_bound_literal(bound_token).ok_or_else(|| err(format!("invalid bound `{bound_token}`")))?;
        // `definrange` asserts a bound independent of (and in addition to)
        // any type tag the column carries, so it is tracked as its own
        // schema entry rather than folded into the column's declared type.
        self.schema.add_range_constraint(id, bound);
        Ok(())
    }

    fn process_defpermutation(&mut self, args: &[SExp]) -> Result<(), ParseError> {
        let [targets, signs, sources] = args else {
            return Err(err("`defpermutation` takes exactly 3 arguments"));
        };
        let target_names = targets.as_list().ok_or_else(|| err("permutation targets must be a list"))?;
        let sign_exprs = signs.as_list().ok_or_else(|| err("permutation signs must be a list"))?;
        let source_names = sources.as_list().ok_or_else(|| err("permutation sources must be a list"))?;

        if target_names.len() != sign_exprs.len() || target_names.len() != source_names.len() {
            return Err(err("permutation targets/signs/sources must have matching length"));
        }

        let mut target_ids = Vec::with_capacity(target_names.len());
        for t in target_names {
            let name = t.as_symbol().ok_or_else(|| err("permutation target must be a column name"))?;
            target_ids.push(self.declare_column(name, ColumnType::Untyped));
        }
        let mut source_ids = Vec::with_capacity(source_names.len());
        for s in source_names {
            let name = s.as_symbol().ok_or_else(|| err("permutation source must be a column name"))?;
            let id = self.resolve_column(name).ok_or_else(|| err(format!("unknown column `{name}`")))?;
            source_ids.push(id);
        }
        let mut sign_values = Vec::with_capacity(sign_exprs.len());
        for s in sign_exprs {
            sign_values.push(parse_sign(s)?);
        }

        let handle = format!("perm#{}", self.schema.permutations.len());
        self.schema.add_permutation(handle, target_ids, source_ids, sign_values);
        Ok(())
    }
}

/// Parse `src` and build the `HirSchema` it describes.
#[cfg_attr(feature = "std", tracing::instrument(skip(src), fields(len = src.len())))]
pub fn parse_schema<F: Field>(src: &str) -> Result<HirSchema<F>, ParseError> {
    let forms = parse(src)?;
    let mut builder = Builder::new();
    for form in &forms {
        let items = form.as_list().ok_or_else(|| err("top-level form must be a list"))?;
        builder.process_top_level_form(items)?;
    }
    Ok(builder.schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fp;

    #[test]
    fn test_tokenizer_handles_comment_before_close_paren() {
        let forms = parse("(defcolumns X ; a comment\n)").unwrap();
        assert_eq!(forms.len(), 1);
        assert!(matches!(&forms[0], SExp::List(items) if items.len() == 2));
    }

    #[test]
    fn test_parse_error_reports_position() {
        let err = parse(")").unwrap_err();
        assert_eq!((err.line, err.col), (1, 1));
    }

    #[test]
    fn test_scenario_1_boolean_constraint() {
        let src = "(defcolumns X) (defconstraint c nil (* X (- X 1)))";
        let schema: HirSchema<Fp> = parse_schema(src).unwrap();
        assert_eq!(schema.columns.len(), 1);
        assert_eq!(schema.vanishing_constraints.len(), 1);
        assert_eq!(schema.vanishing_constraints[0].0, "c");
    }

    #[test]
    fn test_scenario_2_byte_decomposition() {
        let src = "(defcolumns X (B0 :u8) (B1 :u8)) (defconstraint d nil (- X (+ B0 (* 256 B1))))";
        let schema: HirSchema<Fp> = parse_schema(src).unwrap();
        assert_eq!(schema.columns.len(), 3);
        assert_eq!(schema.columns[1].ty, ColumnType::Uint(8));
    }

    #[test]
    fn test_scenario_3_if_zero() {
        let src = "(defcolumns X Y) (defconstraint i nil (if-zero X Y (- Y 1)))";
        let schema: HirSchema<Fp> = parse_schema(src).unwrap();
        assert_eq!(schema.vanishing_constraints.len(), 1);
    }

    #[test]
    fn test_scenario_4_shift() {
        let src = "(defcolumns X) (defconstraint s nil (- X (shift X -1)))";
        let schema: HirSchema<Fp> = parse_schema(src).unwrap();
        assert_eq!(schema.vanishing_constraints.len(), 1);
    }

    #[test]
    fn test_scenario_5_permutation() {
        let src = "(defcolumns S) (defpermutation (T) (+) (S))";
        let schema: HirSchema<Fp> = parse_schema(src).unwrap();
        assert_eq!(schema.permutations.len(), 1);
        assert_eq!(schema.columns.len(), 2);
    }

    #[test]
    fn test_scenario_6_normalise() {
        let src = "(defcolumns X) (defconstraint n nil (- 1 (norm X)))";
        let schema: HirSchema<Fp> = parse_schema(src).unwrap();
        assert_eq!(schema.vanishing_constraints.len(), 1);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let src = "(defconstraint c nil X)";
        let result: Result<HirSchema<Fp>, _> = parse_schema(src);
        assert!(result.is_err());
    }

    #[test]
    fn test_hex_literal() {
        let src = "(defcolumns X) (defconstraint c nil (- X 0xff))";
        let schema: HirSchema<Fp> = parse_schema(src).unwrap();
        assert_eq!(schema.vanishing_constraints.len(), 1);
    }
}
