pub mod analyzer;
pub mod relative_strength;
pub mod returns;

#[cfg(test)]
mod momentum_tests;

pub use analyzer::*;
pub use relative_strength::*;
pub use returns::*;
