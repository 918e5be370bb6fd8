#![allow(dead_code)]

pub mod store_mock;
pub mod surface_mock;
