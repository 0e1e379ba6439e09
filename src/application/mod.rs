pub mod use_cases;

pub use use_cases::correct_address::AddressCorrector;
pub use use_cases::geocode_batch::GeocodeBatchUseCase;
pub use use_cases::refine_coordinate::CoordinateRefiner;
pub use use_cases::resolve_address::{AddressResolver, Resolution};
