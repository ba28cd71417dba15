pub mod publication_metadata;
