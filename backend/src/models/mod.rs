pub mod aggregate;
pub mod calendar;
pub mod filter;
pub mod macros;
pub mod rows;
pub mod school;

pub use aggregate::*;
pub use calendar::*;
pub use filter::*;
pub use rows::*;
pub use school::*;
