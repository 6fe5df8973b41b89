//! Network representations
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod capacity_matrix;
pub mod edge_list;
