//! pumpcalc: Centrifugal Pump Hydraulic Calculation
//!
//! Form-side engines for a pump hydraulic datasheet.
//!
//! ## Architecture
//!
//! - **Record**: field catalog, `EngineeringRecord`, persistence mapping
//! - **Hydraulics**: pure recalculation of every derived field after an edit
//! - **Session**: exclusive owner of a live record; edit → recalculate
//! - **Recommendations**: cached historical statistics, suggestions, auto-fill
//! - **Client**: HTTP access to the calculation backend
//! - **Export**: transient datasheet export status

pub mod client;
pub mod config;
pub mod export;
pub mod hydraulics;
pub mod recommendations;
pub mod record;
pub mod session;

pub use config::PumpCalcConfig;

pub use record::{keys, EngineeringRecord, FieldValue, ParseError, SubmissionStatus};

pub use hydraulics::{dependents_of, recalculate, recalculate_all, recalculate_traced, RecalcReport};

pub use session::{EditError, EditOutcome, EditSession};

pub use recommendations::{
    RecommendationEngine, RecommendationSet, RecommendationSource, RequestContext,
};

pub use client::{BackendClient, ClientError, DatasheetFormat};

pub use export::{ExportStatus, ExportTracker};
