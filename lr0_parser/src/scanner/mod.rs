mod scanner;

pub use scanner::{Scanner, SplitMode};
