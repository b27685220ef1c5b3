//! Action traits for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a store
///
/// Actions describe state changes. They should be:
/// - Clone: actions may be logged or replayed
/// - Debug: for logging
/// - Send + 'static: results are produced on async tasks
///
/// Use `#[derive(Action)]` from `geowatch-macros` to implement this for
/// plain enums. Generic action enums implement it by hand.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Category grouping for actions, generated by `#[action(infer_categories)]`
///
/// Categories are inferred from variant-name prefixes, e.g. `SessionSetUser`
/// and `SessionClearError` both land in `"session"`. `Did*` variants are
/// grouped as `"async_result"`.
pub trait ActionCategory: Action {
    /// The action's category, or `None` when uncategorized
    fn category(&self) -> Option<&'static str>;
}
