pub mod blocks;
pub mod extract;
pub mod labels;
pub mod normalize;
pub mod spelling;

pub use extract::{extract, Records};
pub use normalize::normalize;
pub use spelling::Dictionary;
