//! # Painel SAAR
//!
//! Aggregation engine behind the school-support monitoring dashboard.
//!
//! The crate reads six CSV datasets (schools, classes taught, attendance,
//! management cycle, technical visits and precomputed indicators), scopes
//! their rows through the state → regional → municipality → school
//! hierarchy, and computes per-domain aggregates and headline percentages
//! for any filter selection.
//!
//! ## Architecture
//!
//! - [`models`]: rows, schools, filter context, calendar, aggregate records
//! - [`parsing`]: CSV tokenizer, header-keyed record loader, typed row decoders
//! - [`services`]: school directory, hierarchy traversal engine, the five
//!   domain aggregators and the indicator normalizer
//! - [`datasource`]: dataset repositories, configuration and snapshot loading
//! - [`http`]: Axum-based HTTP server (feature `http-server`)
//!
//! ## Example
//!
//! ```
//! use painel_saar::models::{FilterContext, ReportingPeriod};
//! use painel_saar::parsing::load_records;
//! use painel_saar::services::{DashboardData, RecordSets};
//!
//! let sets = RecordSets {
//!     schools: load_records("id,nome,municipio,regional\n1,EEEFM Alpha,Serra,Carapina\n"),
//!     classes_taught: load_records(
//!         "escola_id,turma,data,dia_letivo,aulas_previstas_LP,aulas_dadas_LP\n1,1A,03/03/2025,1,4,3\n",
//!     ),
//!     ..Default::default()
//! };
//! let data = DashboardData::decode(&sets, "Espírito Santo");
//! let filter = FilterContext::state().with_municipio("Serra").normalize();
//! let view = data.view(&filter, ReportingPeriod::default());
//! assert_eq!(view.indicators.aulas_dadas, 75.0);
//! ```

// RepositoryError carries a context struct in every variant
#![allow(clippy::result_large_err)]

pub mod datasource;
pub mod models;
pub mod parsing;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
