/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// errors module
//
// error kinds shared by the sampling, population and model layers
//
////////////////////////////////////////////////////////////////////////////////////

use std::error::Error;
use std::fmt;

// Every fallible operation in the simulation core returns one of these.
// Conservation-invariant violations are deliberately *not* represented here:
// they indicate a bug in the sampling arithmetic and are asserted fatally
// instead of being handed back to the caller.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EpiError {
    // A probability or count outside its domain, or required data absent
    InvalidArgs,
    // A required parameter was not found in the model data
    MissingData,
    // A parameter was found but failed validation
    InvalidData,
    // Scenario has neither a start day nor a stop day
    InvalidScenario,
    // A sampling subroutine exhausted its retry budget.  Should only be
    // seen if the underlying uniform generator is degenerate.
    UnexpectedState,
}

impl fmt::Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for EpiError {}
