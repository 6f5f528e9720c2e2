mod report;
mod runner;

pub use runner::run;
