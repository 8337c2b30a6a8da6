//! Idempotent resource primitives (check + apply pattern).
pub mod helpers;
pub mod link;

use anyhow::Result;

/// State of a destination on disk, relative to what the engine wants there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the destination.
    Missing,
    /// The destination already matches the desired state.
    Correct,
    /// The destination is one of ours but stale (e.g. a symlink with the
    /// wrong referent, including a dangling one).  Safe to replace.
    Incorrect {
        /// What the destination currently holds.
        current: String,
    },
    /// Something the engine did not create occupies the destination.
    /// Only replaced when forced.
    Invalid {
        /// Why the destination cannot simply be replaced.
        reason: String,
    },
}

/// What the engine does with a destination in a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing there yet: create it.
    Create,
    /// Already correct: leave it alone.
    Keep,
    /// Clear the destination and create it again.
    Replace,
    /// Refuse: something foreign occupies the destination.
    Conflict(String),
}

/// Decide how to treat a destination given its state and the force flag.
///
/// Stale links are always replaced; foreign files and directories only with
/// `force`.
///
/// # Examples
///
/// ```
/// use modman_cli::resources::{Resolution, ResourceState, resolve};
///
/// let occupied = ResourceState::Invalid { reason: "is a regular file".into() };
/// assert_eq!(resolve(&occupied, true), Resolution::Replace);
/// assert!(matches!(resolve(&occupied, false), Resolution::Conflict(_)));
/// assert_eq!(resolve(&ResourceState::Correct, true), Resolution::Keep);
/// ```
#[must_use]
pub fn resolve(state: &ResourceState, force: bool) -> Resolution {
    match state {
        ResourceState::Missing => Resolution::Create,
        ResourceState::Correct => Resolution::Keep,
        ResourceState::Incorrect { .. } => Resolution::Replace,
        ResourceState::Invalid { .. } if force => Resolution::Replace,
        ResourceState::Invalid { reason } => Resolution::Conflict(reason.clone()),
    }
}

/// A destination the engine can inspect and (re)create.
///
/// ```ignore
/// match resource.resolution(force)? {
///     Resolution::Create | Resolution::Replace => resource.apply()?,
///     Resolution::Keep => {}
///     Resolution::Conflict(reason) => bail!(reason),
/// }
/// ```
pub trait Resource {
    /// Human-readable description, e.g. `app/code/Foo -> ../.modman/Foo/code`.
    fn description(&self) -> String;

    /// Inspect the destination without following a link there.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined (I/O failure,
    /// permission denied).
    fn current_state(&self) -> Result<ResourceState>;

    /// Clear whatever occupies the destination, create missing parent
    /// directories, then create the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be cleared or created.
    fn apply(&self) -> Result<()>;

    /// [`resolve`] applied to the current state.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn resolution(&self, force: bool) -> Result<Resolution> {
        Ok(resolve(&self.current_state()?, force))
    }
}
