//! Stream operators: sources produce records from the backend, decorators
//! wrap child streams and transform their record sequence.

pub mod cartesian;
pub mod echo;
pub mod hash_join;
pub mod having;
pub mod merge;
pub mod rollup;
pub mod search;
pub mod select;
pub mod sort;
pub mod top;
pub mod tup;
pub mod unique;

pub use cartesian::CartesianProductStream;
pub use echo::EchoStream;
pub use hash_join::HashJoinStream;
pub use having::HavingStream;
pub use merge::MergeStream;
pub use rollup::RollupStream;
pub use search::SearchStream;
pub use select::{SelectStream, Selection};
pub use sort::SortStream;
pub use top::RankStream;
pub use tup::TupStream;
pub use unique::UniqueStream;
