//! Test Helpers

use crate::domain::movies::{data::NewMovie, records::Runtime};

pub(crate) fn new_movie(title: &str) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        year: 1942,
        runtime: Runtime(102),
        genres: vec!["drama".to_string()],
    }
}
