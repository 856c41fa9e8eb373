//! Estimation algorithms: grid projection, simplex minimization, and
//! bearing triangulation

pub mod projection;
pub mod simplex;
pub mod triangulation;
