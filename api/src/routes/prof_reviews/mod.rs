pub mod prof_reviews_request;
pub mod prof_reviews_route;
