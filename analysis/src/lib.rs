pub mod coordinates;
pub mod grenades;
pub mod records;
pub mod rounds;
pub mod timeline;

pub use common::demo_analysis::{GrenadeType, NadeState, PlayerState, Position, Round, TickState};
