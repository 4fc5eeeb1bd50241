pub mod deque;

pub use deque::{RingDeque, MIN_CAPACITY};
