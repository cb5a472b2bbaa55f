#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod device;
mod error;
mod fixed;
mod generator;
mod producer;
mod rand;
mod record;
mod sink;
mod stats;

#[cfg(test)]
mod mock;

pub use crate::device::*;
pub use crate::error::*;
pub use crate::fixed::*;
pub use crate::generator::*;
pub use crate::producer::*;
pub use crate::rand::*;
pub use crate::record::*;
pub use crate::sink::*;
pub use crate::stats::*;
