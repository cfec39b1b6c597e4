pub mod tridiagonal;

pub use tridiagonal::*;
