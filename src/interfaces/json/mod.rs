pub mod fixture_api;
