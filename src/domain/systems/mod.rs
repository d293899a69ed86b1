// Per-tick simulation systems operating on world state slices.

pub mod ballistics;
pub mod collision;
pub mod spawner;
