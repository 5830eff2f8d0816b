/// Read-only views derived from a station reading.
///
/// Nothing here performs I/O or mutates the reading; each function maps a
/// `StationReading` to text or rows for the assistant and the dashboard.
///
/// Submodules:
/// - `context` — the text block the assistant is grounded on.
/// - `sensors` — sensor table rows and headline metrics.

pub mod context;
pub mod sensors;
