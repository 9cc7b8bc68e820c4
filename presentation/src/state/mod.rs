//! Client-side turn state

pub mod reducer;
