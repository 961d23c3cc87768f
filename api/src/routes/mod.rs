pub mod prof_reviews;
