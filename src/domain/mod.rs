//! Domain types for the equity console.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Strict civil dates (`Ymd`) and calendar-month arithmetic
//! - Cap-table, grant, purchase-plan, share-class and financing entities
//! - The aggregate `AppState` with its canonical JSON shape

pub mod cap_table;
pub mod date;
pub mod decimal;
pub mod financing;
pub mod grant;
pub mod plan;
pub mod provenance;
pub mod share_class;
pub mod state;

pub use cap_table::{CapTableBase, DilutionEvent, ExitScenario, ValuationPoint, Valuations};
pub use date::{DateError, Ymd};
pub use decimal::Decimal;
pub use financing::{ConvertibleInstrument, ConvertibleType, ConvertsOn, FinancingRound};
pub use grant::{Acceleration, AccelerationType, OptionGrant, VestingFrequency, VestingSchedule};
pub use plan::{ContributionChange, PurchasePlan, PurchasePriceMode};
pub use provenance::DerivedSource;
pub use share_class::{Holding, Participation, ShareClass, ShareClassType};
pub use state::{AppState, Currency, SchemaVersion, Settings};
