//! Filesystem primitives, the backup area and the userspace link resource.
//!
//! A resource knows where it should end up and can tell how far the disk is
//! from that. Operations inspect [`Resource::current_state`] first and only
//! call [`Resource::apply`] once anything in the way has been dealt with.
pub mod backup;
pub mod fs;
pub mod symlink;

use crate::error::FsResult;

/// How a resource on disk compares with where it should be.
///
/// ```
/// use dotsync::resources::ResourceState;
///
/// let occupied = ResourceState::Incorrect { current: "is a regular file".into() };
/// assert_ne!(occupied, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing is there yet.
    Missing,
    /// Already in place.
    Correct,
    /// Something else occupies the location.
    Incorrect {
        /// Description of the occupant.
        current: String,
    },
    /// The resource cannot exist, e.g. its dotfile is gone.
    Invalid {
        /// Why.
        reason: String,
    },
}

/// What applying a resource did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// The disk was changed.
    Applied,
    /// The resource was already in place.
    AlreadyCorrect,
}

/// Something on disk that can be checked and then put in place.
pub trait Resource {
    /// One-line description for logs.
    fn description(&self) -> String;

    /// Inspect the disk without changing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be inspected.
    fn current_state(&self) -> FsResult<ResourceState>;

    /// Put the resource in place. The location must be free.
    ///
    /// # Errors
    ///
    /// Returns an error naming the filesystem step that failed.
    fn apply(&self) -> FsResult<ResourceChange>;
}
