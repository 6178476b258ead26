// Library root: snapshot sources, report rendering and the run driver,
// exposed so integration tests can drive a run without the binary.

pub mod cli;
pub mod report;
pub mod source;
