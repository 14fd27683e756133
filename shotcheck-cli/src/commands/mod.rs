pub mod assess;
pub mod bridge;
pub mod serve;
pub mod sessions;
