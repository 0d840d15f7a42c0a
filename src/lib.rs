pub mod fetch;
pub mod geojson_io;
pub mod layers;
pub mod pollution;
pub mod routes;
pub mod snapshot;
