pub mod mesh;
pub mod points;
