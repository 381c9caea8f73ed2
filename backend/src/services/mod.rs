//! Aggregation services.
//!
//! Everything here is a pure function of the decoded datasets and a
//! normalized filter: the school directory scopes rows to the hierarchy,
//! the traversal engine in [`hierarchy`] folds them, and each domain module
//! supplies its counters and derived percentages.

pub mod attendance;
pub mod classes_taught;
pub mod dashboard;
pub mod directory;
pub mod hierarchy;
pub mod indicators;
pub mod percent;
pub mod products;
pub mod tasks;
pub mod technical_visits;


pub use attendance::{Attendance, AttendanceSummary};
pub use classes_taught::{ClassesTaught, ClassesTaughtSummary};
pub use dashboard::{domain_view, DashboardData, DashboardView, DomainView, RecordSets};
pub use directory::{ChildEntity, FilterConflict, SchoolDirectory};
pub use hierarchy::{aggregate, aggregate_by_children, DomainAggregator};
pub use indicators::{build_indicator_table, compose, indicator_table_to_csv, resolve, ResolvedIndicator};
pub use percent::percentage;
pub use products::{Products, ProductsSummary};
pub use tasks::{Tasks, TasksSummary};
pub use technical_visits::{ManagementVisits, TechnicalVisits, TechnicalVisitsSummary};
