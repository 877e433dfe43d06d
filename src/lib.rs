pub mod liepajniekiem {
    pub mod api;
    pub mod handler;
    pub mod model;
    pub mod parser;
}

pub mod config {
    pub mod env_loader;
    pub mod model;
}

pub mod tracing;
