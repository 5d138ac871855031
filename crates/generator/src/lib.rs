//! Static site generation: the page matrix, JSON-LD and companion files.

pub mod faq;
pub mod html;
pub mod reviews;
pub mod schema;
pub mod site;
pub mod sitemap;

pub use reviews::{AggregateRating, PublicReview, ReviewStore};
pub use site::{BuildOptions, GeneratedSite, generate_site, output_file};
