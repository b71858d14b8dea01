//! City name to IANA time zone resolution.
//!
//! [`TimezoneResolver`] accepts either an explicit identifier such as
//! `Asia/Taipei` or a free-form city name such as `new york`, and returns a
//! [`Resolution`]: the zone and its current local time, a sorted list of
//! candidates when the name is ambiguous, or a [`ResolveError`].
//!
//! ```rust
//! use std::sync::Arc;
//! use jiff::{tz::offset, Timestamp};
//! use weather_time_agent::timezone::{FixedCatalog, FixedClock, TimezoneResolver};
//!
//! let catalog = FixedCatalog::new().with_zone("Asia/Taipei", offset(8));
//! let clock = FixedClock::new(Timestamp::UNIX_EPOCH);
//! let resolver = TimezoneResolver::new(Arc::new(catalog), Arc::new(clock));
//!
//! assert_eq!(resolver.resolve_time("taipei").timezone(), Some("Asia/Taipei"));
//! ```

pub mod catalog;
pub mod clock;
pub mod matching;
pub mod resolution;
pub mod resolver;

pub use catalog::{CatalogError, FixedCatalog, SystemCatalog, TimezoneCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use matching::{final_segment, normalize_city};
pub use resolution::{ResolveError, Resolution};
pub use resolver::{TimezoneResolver, MAX_CANDIDATES};
