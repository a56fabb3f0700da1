// Repository implementations over the PostgreSQL pool

pub mod subscription;
pub mod vehicle;

pub use subscription::{PgSubscriberDirectory, SubscriberDirectory};
pub use vehicle::{PgVehicleLedger, VehicleLedger};
