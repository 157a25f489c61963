//! End-to-end checks of the sweep pipeline against scripted network doubles.

pub mod fakes;

#[cfg(test)]
mod discovery;
