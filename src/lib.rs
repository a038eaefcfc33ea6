pub mod aggregate;
pub mod analysis;
pub mod args;
pub mod domain;
pub mod ranking;
pub mod reader;
pub mod report;
pub mod sqlite;
pub mod stats;
pub mod utils;

pub use aggregate::{aggregate, DomainDateCounts};
pub use analysis::run;
pub use args::Args;
pub use ranking::{rank, Baseline, RankOptions, Ranking};
pub use report::{build_report, GrowthFormula, ReportFormat};
pub use stats::{AnalysisResult, RankedDomain, Record, Report, ReportRow};
