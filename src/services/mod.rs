pub mod dashboard;
pub mod export;
pub mod lookup;
pub mod payments;
pub mod remote;
pub mod trips;
