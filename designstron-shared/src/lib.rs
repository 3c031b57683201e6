pub mod money;
pub mod pii;

pub use money::{to_minor_units, MoneyError};
pub use pii::Masked;
