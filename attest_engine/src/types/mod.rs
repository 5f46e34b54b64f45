pub mod method;
pub mod outcome;

pub use method::Method;
pub use outcome::Outcome;
