//! Various unsorted utilities.

pub use self::cancel::{CancelToken, Cancelled};
pub use self::hashmap::{Entry, HashMap, HashSet};

mod cancel;
pub mod hashmap;
