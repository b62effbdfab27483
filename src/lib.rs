//! City Traffic Simulation Library
//!
//! A discrete grid traffic simulation that runs headless; visualization and
//! map parsing are external collaborators.

pub mod simulation;
