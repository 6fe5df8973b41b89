//! Flow algorithms and the run state they share
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;
pub mod state;
pub mod traits;

pub use self::traits::*;
