//! Human-readable reports of rules and of the changes they made.
//!
//! - Documentation mode renders every registered rule with its code samples.
//! - Live mode renders the records of a [`Changelog`](crate::changelog::Changelog).
//!
//! Both modes group rules by a category derived from the rule name and emit
//! the same markdown layout.

mod category;
mod markdown;

pub use category::{detect_category, group_by_category, slugify, UNCATEGORIZED};
pub use markdown::{describe_registry, Reporter};
