pub mod bid_flow_api;
pub mod load_flow_api;
pub mod market_objects;
pub mod matching_api;
pub mod quota_api;
pub mod trip_flow_api;

pub use bid_flow_api::BidFlowApi;
pub use load_flow_api::LoadFlowApi;
pub use matching_api::MatchingApi;
pub use quota_api::QuotaApi;
pub use trip_flow_api::TripFlowApi;
