/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// A discrete-time, stochastic compartmental epidemic simulator.
//
// One population moves through susceptible, infected (binned by day since
// infection), recovered, vaccinated and dead categories.  Transitions are
// drawn from approximate binomial distributions rather than simulated per
// individual, so populations of hundreds of millions evolve in constant
// time per day.
//
////////////////////////////////////////////////////////////////////////////////////

pub mod data_management;
pub mod disease;
pub mod errors;
pub mod model;
pub mod population;
pub mod sampling;
pub mod stats;
