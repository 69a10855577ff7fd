//! Evaluation context lattice: which module an expression lives in, and at
//! what length multiplier.
//!
//! Every AIR/MIR/HIR expression carries a [`Context`]. Constant expressions
//! live in the bottom element ([`Context::Void`]); joining two contexts that
//! disagree produces the top element ([`Context::Conflicted`]), which a
//! schema must reject rather than silently propagate.

#[cfg(not(feature = "std"))]
use alloc::string::String;
use core::fmt;

/// The module + length-multiplier pair that scopes an expression.
///
/// Represented as a genuine three-way sum type, not a sentinel multiplier of
/// `0` / `u32::MAX`, so that accessors like `module()` can simply not exist
/// on the variants where they are nonsensical, instead of panicking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    /// The bottom element: no enclosing module, length multiplier zero.
    /// Contained in (absorbed by) every other context when joined.
    Void,
    /// A genuine evaluation context: column accesses in module `module`,
    /// evaluated once per `multiplier` rows of the base trace length.
    Proper { module: usize, multiplier: u32 },
    /// The top element: the result of joining two incompatible proper
    /// contexts. A schema must reject any constraint whose expression
    /// resolves to this.
    Conflicted,
}

impl Context {
    /// Construct a proper context for the given module and multiplier.
    pub fn new(module: usize, multiplier: u32) -> Self {
        Context::Proper { module, multiplier }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Context::Void)
    }

    pub fn is_conflicted(&self) -> bool {
        matches!(self, Context::Conflicted)
    }

    /// The enclosing module, or `None` for `Void`/`Conflicted`.
    pub fn module(&self) -> Option<usize> {
        match self {
            Context::Proper { module, .. } => Some(*module),
            _ => None,
        }
    }

    /// The length multiplier, or `None` for `Void`/`Conflicted`.
    pub fn multiplier(&self) -> Option<u32> {
        match self {
            Context::Proper { multiplier, .. } => Some(*multiplier),
            _ => None,
        }
    }

    /// `true` iff this is a proper context whose multiplier is a power of
    /// two, as required of any context feeding the prover.
    pub fn has_power_of_two_multiplier(&self) -> bool {
        match self {
            Context::Proper { multiplier, .. } => multiplier.is_power_of_two(),
            _ => false,
        }
    }

    /// Scale the length multiplier by `factor`. `Void` and `Conflicted` are
    /// unaffected (there is nothing to scale).
    pub fn multiply(self, factor: u32) -> Self {
        match self {
            Context::Proper { module, multiplier } => Context::Proper {
                module,
                multiplier: multiplier * factor,
            },
            other => other,
        }
    }

    /// The least upper bound of two contexts: `Void` is the identity,
    /// `Conflicted` absorbs everything, and two distinct proper contexts
    /// join to `Conflicted`.
    pub fn join(self, other: Self) -> Self {
        match (self, other) {
            (Context::Void, other) => other,
            (this, Context::Void) => this,
            (Context::Conflicted, _) | (_, Context::Conflicted) => Context::Conflicted,
            (a, b) if a == b => a,
            _ => Context::Conflicted,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Void => write!(f, "void"),
            Context::Conflicted => write!(f, "conflicted"),
            Context::Proper { module, multiplier } => write!(f, "{module}*{multiplier}"),
        }
    }
}

/// Fold `join` over an iterator of contexts, starting from [`Context::Void`].
/// Used to compute the context of an n-ary arithmetic node from its
/// arguments.
pub fn join_all<I: IntoIterator<Item = Context>>(contexts: I) -> Context {
    contexts.into_iter().fold(Context::Void, Context::join)
}

/// A human-readable description of why a context is unusable in a
/// constraint, used to build [`crate::hir::SchemaError::ContextConflict`]
/// messages.
pub fn describe_conflict(expr_repr: &str) -> String {
    #[cfg(not(feature = "std"))]
    use alloc::format;
    format!("expression `{expr_repr}` has a void or conflicted context")
}
