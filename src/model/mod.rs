//! Report specification types produced by the compiler.

pub mod period;
pub mod spec;

pub use period::{ComparativePeriods, DateCue, DateRange};
pub use spec::{
    ConversationContext, FilterValue, Filters, ParsedQuerySpec, PROVIDER_MAX_LIMIT,
};
