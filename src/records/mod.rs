mod process;

pub use process::ProcessRecord;
