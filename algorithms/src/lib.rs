#![allow(clippy::comparison_chain, clippy::needless_lifetimes)]

pub mod cvt;
pub mod fit;
pub mod scale;
pub mod timing;
