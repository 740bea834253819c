//! Tabular design formats and CSV IO.
//!
//! ## Layouts
//!
//! | Layout | Rows | Columns |
//! |--------|------|---------|
//! | wide candidates | one per choice situation | id, `alt1.<CODE>` × 9, `alt2.<CODE>` × 9 |
//! | long (idefix) | three per situation: alt1, alt2, no-choice zeros | bare attribute names |
//! | modfed | one per alternative, no-choice rows flagged | indicator, attributes, effect flag pairs |
//! | ngene | one per situation | `choice situation`, `alt1.<col>`, `alt2.<col>` (lower case) |
//!
//! All layouts are held in memory as a [`Table`].

mod io;
mod long;
mod ngene;
mod table;

pub use io::{
    format_value, persist_all, read_table, read_table_from, write_table, write_table_to,
    AtomicCsvWriter, StagedCsv,
};
pub use long::{long_to_wide, wide_to_long, ALT1_PREFIX, ALT2_PREFIX, ROWS_PER_SITUATION, SITUATION_COLUMN};
pub use ngene::{modfed_to_ngene, EffectCoding, NgeneSchema, DEFAULT_NO_CHOICE_COLUMN};
pub use table::Table;
