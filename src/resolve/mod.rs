// Resolution layer: merges base content and overrides into render models at serving time.

pub mod diversify;
pub mod geo;
pub mod merge;
pub mod page;
pub mod structured;

pub use merge::resolve;
pub use page::PageResolver;
