pub mod signals;

pub use signals::{Recommendation, SignalFamily, Strength};
