// Entity Models - Trip, Traveler, Contribution
// Value records with stable uuid identity; all mutation goes through a store

pub mod trip;
pub mod traveler;
pub mod contribution;

pub use trip::Trip;
pub use traveler::Traveler;
pub use contribution::Contribution;
