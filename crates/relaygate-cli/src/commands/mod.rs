pub mod bulk;
pub mod preflight;
pub mod recommend;
pub mod report;
pub mod routes;
pub mod session;
