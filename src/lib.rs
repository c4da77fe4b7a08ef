#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub use self::{
	error::{Code, Error, Operation, Result},
	fs::{Fs, Host, Kind},
	options::Options,
	retry::{Outcome, Platform, Policy},
	rmrf::{rmrf, Deleter},
};

pub mod error;
pub mod fs;
pub mod options;
pub mod retry;
mod rmrf;
