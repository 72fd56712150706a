//! Entity trait: identity + continuity across state changes.

/// Entity marker + the minimal interface the persistence gateway needs.
///
/// Field updates and list filters are expressed as associated types so a
/// gateway can apply them without knowing anything about the entity's
/// business rules. Both operations must stay pure.
pub trait Entity: Clone {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Partial field update accepted by `update_fields`.
    type Patch: Clone + core::fmt::Debug;

    /// Selection criteria accepted by `list` and `delete_where`.
    type Filter: core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether `patch` was planned against a state other than this one.
    ///
    /// Gateways refuse stale patches with a conflict instead of applying
    /// them. Patches that do not depend on prior state are never stale.
    fn is_stale(&self, _patch: &Self::Patch) -> bool {
        false
    }

    /// Apply a field update in place.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Whether this entity is selected by `filter`.
    fn matches(&self, filter: &Self::Filter) -> bool;
}
