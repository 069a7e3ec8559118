mod bootsector;
mod compose;

use crate::consts::*;
use crate::error::*;
use crate::utils::bincode::bincode_config;

pub use bootsector::*;
pub use compose::*;
