pub mod agent;
pub mod composer;
pub mod instruction_builder;
pub mod parser;
pub mod runtime;

#[cfg(test)]
mod tests;
