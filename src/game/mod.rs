mod daily;
mod validity;

pub use daily::DailySelection;
pub use validity::ValidityPolicy;
