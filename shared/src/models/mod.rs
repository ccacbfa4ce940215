//! Data models
//!
//! Shared between the floor engine and its collaborators (floor map, order
//! taking, reservation store adapters). All table IDs are `i64`.

pub mod dining_table;
pub mod floor_plan;
pub mod order;
pub mod placement;
pub mod reservation;
pub mod shift;
pub mod table_state;

// Re-exports
pub use dining_table::*;
pub use floor_plan::*;
pub use order::*;
pub use placement::*;
pub use reservation::*;
pub use shift::*;
pub use table_state::*;
