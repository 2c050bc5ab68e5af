//! Live-editor markup: escaping, classification, position reconciliation and
//! the debounce scheduler for the heavy pipeline.
//!
//! Fast path (per content change, synchronous):
//! source -> `Lexer` -> tokens -> `reconcile::Reconciler` -> markup.
//! `highlight::highlight` wraps that path and owns the unstyled fallback.
//!
//! Exposed components:
//! - `escape`: the five-character HTML escaper used for every text fragment.
//! - `style`: exhaustive token kind -> class mapping (`classify`, `StyleMap`).
//! - `reconcile`: cursor-driven gap filler. Output always round-trips to the
//!   exact source text.
//! - `highlight`: lex + reconcile with fallback and timing.
//! - `scheduler`: trailing-edge `Debouncer` used by the runtime to gate the
//!   parse/transpile pipeline.
//! - `timing`: last pass duration.
//!
//! Telemetry counters (`reconcile::RECONCILE_PASSES`, `reconcile::TOKENS_REJECTED`,
//! `highlight::HIGHLIGHT_FALLBACKS`) are process-wide relaxed atomics.

pub mod escape;
pub mod highlight;
pub mod reconcile;
pub mod scheduler;
pub mod style;
pub mod timing;

pub use escape::{escape, escape_into};
pub use highlight::highlight;
pub use reconcile::{Cursor, Reconciler, reconcile};
pub use scheduler::Debouncer;
pub use style::{StyleClass, StyleMap, classify};
