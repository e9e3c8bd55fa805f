//! Accessors converting stored timestamps into [`jiff::Timestamp`].

/// Models that record when they were created.
pub trait HasCreatedAt {
    /// Returns the creation timestamp.
    fn created_at(&self) -> jiff::Timestamp;
}

/// Models that record when they were last modified.
pub trait HasUpdatedAt {
    /// Returns the last update timestamp.
    fn updated_at(&self) -> jiff::Timestamp;

    /// Returns whether the row was modified after creation.
    fn was_edited(&self) -> bool
    where
        Self: HasCreatedAt,
    {
        self.updated_at() > self.created_at()
    }
}
