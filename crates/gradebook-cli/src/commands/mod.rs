pub mod migrate;
pub mod show;

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;
