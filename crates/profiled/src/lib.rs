// # profiled
//
// HTTP boundary for the profile directory service. This is a THIN layer:
// routing, request decoding and response rendering only. All profile
// decisions live in profile-core.

pub mod routes;

pub use routes::router;
