pub mod curve2;
pub mod curve3;
pub mod dual;
pub mod surface;
