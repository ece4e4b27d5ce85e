//! # drisk-calendar
//!
//! Proleptic Gregorian ordinal dates as stored on hazard event sets, and
//! the simulation-year bookkeeping built on top of them.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["ordinal (i64, day 1 = 0001-01-01)"] -->|"year_of()"| B["calendar year"]
//!     C["(year, month, day)"] -->|"ordinal_from_ymd()"| A
//!     B -->|"YearRange::from_years()"| D["YearRange"]
//!     B -->|"events_per_year()"| E["BTreeMap year -> count"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use drisk_calendar::{ordinal_from_ymd, year_of, YearRange};
//!
//! let ord = ordinal_from_ymd(1980, 7, 14).unwrap();
//! assert_eq!(year_of(ord).unwrap(), 1980);
//!
//! let range = YearRange::from_years(&[1980, 1999, 1985]).unwrap();
//! assert_eq!(range.span(), 20);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `ordinal` | Ordinal day number conversions |
//! | `years` | Year ranges and per-year event counts |
//! | `error` | Error types |

mod error;
mod ordinal;
mod years;

pub use error::CalendarError;
pub use ordinal::{ordinal_from_ymd, year_of, years_of};
pub use years::{YearRange, events_per_year, unique_years};
