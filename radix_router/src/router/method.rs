//! Maps request methods onto route table slots.

/// Pseudo-method whose routes answer requests of every method without a route of its own.
pub const ANY: &str = "ANY";

const METHODS: [&str; 10] = [
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE", ANY,
];

/// Number of route table slots, `ANY` included.
pub(crate) const SLOTS: usize = METHODS.len();

/// Slot of the `ANY` route table.
pub(crate) const ANY_SLOT: usize = SLOTS - 1;

/// Slot for `method`, `None` when the method is not routable. Matching is case sensitive, as
/// method names are.
pub(crate) fn slot(method: &str) -> Option<usize> {
    METHODS.iter().position(|m| *m == method)
}
