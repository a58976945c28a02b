pub mod util;

pub use util::{parse_seeds, read_optional, split_csv};
