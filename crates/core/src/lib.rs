pub mod academics;
pub mod complaints;
pub mod credentials;
pub mod enums;
pub mod events;
pub mod fees;
pub mod leads;
pub mod people;
pub mod tenancy;
pub mod time;
pub mod validate;

pub use academics::*;
pub use complaints::*;
pub use enums::*;
pub use events::*;
pub use fees::*;
pub use leads::*;
pub use people::*;
pub use tenancy::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
