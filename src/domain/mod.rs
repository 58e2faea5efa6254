// Domain layer: content model, render model and ports (interfaces).

pub mod model;
pub mod ports;
pub mod render;
