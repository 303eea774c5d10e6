//! Operation kinds, phases, hook keys, and the interceptor trait.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hookstore_core::error::AppError;
use hookstore_core::result::AppResult;
use hookstore_core::types::document::Document;

/// CRUD verb category a hook chain is scoped to.
///
/// Facade methods map onto these coarse kinds: `find` and `find_one` both
/// run the `Find` chains, `update_one` and `update_many` both run `Update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Document insertion.
    Insert,
    /// Document lookup.
    Find,
    /// Document modification.
    Update,
    /// Document removal.
    Delete,
}

impl OperationKind {
    /// Every operation kind, in declaration order.
    pub const ALL: [OperationKind; 4] = [Self::Insert, Self::Find, Self::Update, Self::Delete];

    /// Returns the string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Find => "find",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Self::Insert),
            "find" => Ok(Self::Find),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(AppError::unknown_operation_kind(format!(
                "Unknown operation kind '{other}'. Supported: insert, find, update, delete"
            ))),
        }
    }
}

/// Stage of the pipeline a hook runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Runs on the operation input, before the backend call.
    Before,
    /// Runs on the operation output, after the backend call resolves.
    After,
}

impl Phase {
    /// Both phases, in pipeline order.
    pub const ALL: [Phase; 2] = [Self::Before, Self::After];

    /// Returns the string name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(AppError::unknown_operation_kind(format!(
                "Unknown hook phase '{other}'. Supported: before, after"
            ))),
        }
    }
}

/// Two-dimensional registry key: which kind, which phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookKey {
    /// The operation kind.
    pub kind: OperationKind,
    /// The phase.
    pub phase: Phase,
}

impl HookKey {
    /// Creates a key.
    pub const fn new(kind: OperationKind, phase: Phase) -> Self {
        Self { kind, phase }
    }

    /// Shorthand for a before-phase key.
    pub const fn before(kind: OperationKind) -> Self {
        Self::new(kind, Phase::Before)
    }

    /// Shorthand for an after-phase key.
    pub const fn after(kind: OperationKind) -> Self {
        Self::new(kind, Phase::After)
    }

    /// Every (kind, phase) pair.
    pub fn all() -> impl Iterator<Item = HookKey> {
        OperationKind::ALL
            .into_iter()
            .flat_map(|kind| Phase::ALL.into_iter().map(move |phase| Self::new(kind, phase)))
    }
}

impl fmt::Display for HookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.phase, self.kind)
    }
}

/// Parses names of the form `before_insert` / `after_find`.
impl FromStr for HookKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (phase, kind) = s.split_once('_').ok_or_else(|| {
            AppError::unknown_operation_kind(format!(
                "Malformed hook name '{s}'. Expected '<phase>_<kind>', e.g. 'before_insert'"
            ))
        })?;

        Ok(Self::new(kind.parse()?, phase.parse()?))
    }
}

/// A transformation applied to a document during one phase.
///
/// Interceptors are anonymous: the registry keeps no identity for them and
/// orders them purely by registration time. Returning an error aborts the
/// fold it is part of.
pub trait Interceptor: Send + Sync {
    /// Transforms the value produced by the previous interceptor.
    fn intercept(&self, value: Document) -> AppResult<Document>;
}

impl<F> Interceptor for F
where
    F: Fn(Document) -> AppResult<Document> + Send + Sync,
{
    fn intercept(&self, value: Document) -> AppResult<Document> {
        self(value)
    }
}
