//! Source surfaces the classifier can cast rays against.

pub use self::triangle_soup::{SurfaceError, TriangleSoup};

mod triangle_soup;
