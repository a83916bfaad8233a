pub mod audio;
pub mod collision;
pub mod entity;
pub mod geometry;
pub mod grid;
pub mod movement;
pub mod object;
pub mod screen;
pub mod tile;
pub mod viewport;
