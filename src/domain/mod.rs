pub mod models;

pub use models::{
    NewRating, NewSubject, RatingPatch, RatingRecord, RatingSubmission, SubjectProfile,
};
