//! Off-chain model of the Eco-Carbon token and a simulator of the pilot
//! program that feeds it.

pub mod run;
pub mod simulator;
pub mod token;
